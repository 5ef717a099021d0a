//! # crudcore
//!
//! Generic base layer for CRUD REST resources on axum and sea-orm.
//!
//! A resource is a sea-orm entity carrying the record base columns (`id`,
//! `code`, `title`, `created_at`, `updated_at`, `is_deleted`) plus a marker
//! type implementing [`RecordCore`]. From that it gets:
//!
//! - a [`Controller`] with create, read, update, soft delete, undelete, hard
//!   delete and a paginated, searchable, owner-scoped listing
//! - a [`RouterCore`] serving those operations over HTTP with a uniform
//!   `{"status", "data" | "message"}` envelope
//! - a [`SchemaCore`] formatting timestamps for output
//!
//! ```rust,ignore
//! let app = ApiBuilder::new(db)
//!     .resource(RouterCore::<Example>::new())
//!     .build(&AppConfig::default());
//! ```

pub mod app;
pub mod config;
pub mod core;
pub mod errors;
pub mod logging;
pub mod migration;
pub mod models;
pub mod openapi;
pub mod resources;
pub mod response;
pub mod search;

pub use app::{ApiBuilder, build_app};
pub use config::AppConfig;
pub use crate::core::{
    controller::{Controller, ErrorPolicy, ListQuery, Listing, Lookup, Page},
    record::{MergeIntoActiveModel, RecordCore},
    router::{ActionContext, RouterCore},
    schema::{SchemaCore, flexible_datetime},
};
pub use errors::ApiError;
pub use response::Envelope;
