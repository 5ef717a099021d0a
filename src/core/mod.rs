pub mod controller;
pub mod record;
pub mod router;
pub mod schema;
