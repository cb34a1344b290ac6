pub mod aggregator;
pub mod database; // Per-platform catalog drivers
pub mod query_builder;
pub mod schema_service;
pub mod version;

pub use aggregator::{assemble_table_schema, build_table_schema};
pub use database::{create_driver, Operation, Platform, SchemaDriver};
pub use query_builder::Select;
pub use schema_service::CrossSchema;
pub use version::{extract_postgres_version, version_compare};
