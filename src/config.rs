use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub target: TargetConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Platform name or driver alias
    pub platform: String,
    pub url: String,
}

/// Table to describe, if any
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetConfig {
    pub table: Option<String>,
    pub schema: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Try to load from .env file
        let _ = dotenv::dotenv();

        let mut builder = config::Config::builder()
            .set_default("connection.platform", "sqlite")?
            .set_default("connection.url", "sqlite::memory:")?
            .set_default("logging.level", "info")?;

        if let Ok(platform) = env::var("CROSS_SCHEMA_PLATFORM") {
            builder = builder.set_override("connection.platform", platform)?;
        }

        if let Ok(database_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("connection.url", database_url)?;
        }

        if let Ok(table) = env::var("CROSS_SCHEMA_TABLE") {
            builder = builder.set_override("target.table", Some(table))?;
        }

        if let Ok(schema) = env::var("CROSS_SCHEMA_SCHEMA") {
            builder = builder.set_override("target.schema", Some(schema))?;
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            builder = builder.set_override("logging.level", log_level)?;
        }

        builder.build()?.try_deserialize()
    }
}
