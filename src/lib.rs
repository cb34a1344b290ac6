pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod services;

pub use error::{SchemaError, SchemaResult};
pub use executor::{CatalogExecutor, CatalogRow};
pub use models::*;
pub use services::*;
