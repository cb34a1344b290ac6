use thiserror::Error;

/// Boxed error raised by a catalog query executor
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for schema introspection
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema introspection error types
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("{}", unsupported_message(.0))]
    UnsupportedPlatform(String),

    #[error("{operation} not implemented for {platform}")]
    NotImplementedForPlatform {
        operation: String,
        platform: String,
    },

    /// Failure raised by the catalog query executor, passed through untouched
    #[error("Catalog query failed: {0}")]
    CatalogQuery(#[source] BoxError),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn unsupported_message(platform: &str) -> String {
    if platform.trim().is_empty() {
        "No platform specified".to_string()
    } else {
        format!("Unsupported platform: {}", platform)
    }
}

impl SchemaError {
    /// Wrap any executor failure without altering it
    pub fn query<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        SchemaError::CatalogQuery(err.into())
    }

    pub fn not_implemented(operation: impl Into<String>, platform: impl Into<String>) -> Self {
        SchemaError::NotImplementedForPlatform {
            operation: operation.into(),
            platform: platform.into(),
        }
    }
}

impl From<rusqlite::Error> for SchemaError {
    fn from(err: rusqlite::Error) -> Self {
        SchemaError::query(err)
    }
}

impl From<mysql_async::Error> for SchemaError {
    fn from(err: mysql_async::Error) -> Self {
        SchemaError::query(err)
    }
}

impl From<tokio_postgres::Error> for SchemaError {
    fn from(err: tokio_postgres::Error) -> Self {
        SchemaError::query(err)
    }
}

impl From<config::ConfigError> for SchemaError {
    fn from(err: config::ConfigError) -> Self {
        SchemaError::Config(err.to_string())
    }
}
