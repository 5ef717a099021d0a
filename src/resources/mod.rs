//! Concrete resources served by the binary.

use crate::{app::ApiBuilder, core::router::RouterCore};

pub mod example;

/// Mount every resource of this crate.
#[must_use]
pub fn register(builder: ApiBuilder) -> ApiBuilder {
    builder.resource(RouterCore::<example::Example>::new())
}
