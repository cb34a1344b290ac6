use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info};

use cross_schema::config::Config;
use cross_schema::executor::{
    CatalogExecutor, MySqlExecutor, PostgresExecutor, SqlSrvExecutor, SqliteExecutor,
};
use cross_schema::{CrossSchema, Platform};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    let platform = Platform::resolve(Some(config.connection.platform.as_str())).map_err(|e| {
        error!("Cannot resolve platform: {}", e);
        e
    })?;

    let executor: Arc<dyn CatalogExecutor> = match platform {
        Platform::Sqlite => Arc::new(SqliteExecutor::open(&config.connection.url)?),
        Platform::MySql => Arc::new(MySqlExecutor::new(&config.connection.url)?),
        Platform::Postgres => Arc::new(PostgresExecutor::new(&config.connection.url)?),
        Platform::SqlSrv => Arc::new(SqlSrvExecutor::new(&config.connection.url)?),
    };

    let schema = CrossSchema::new(Some(config.connection.platform.as_str()), executor);
    let target_schema = config.target.schema.as_deref();

    let version = schema
        .get_database_version()
        .await
        .context("Failed to read server version")?;
    info!("Connected to {} {}", platform, version);

    let tables = schema
        .list_tables(target_schema)
        .await
        .context("Failed to list tables")?;
    println!("{}", serde_json::to_string_pretty(&tables)?);

    if let Some(table) = config.target.table.as_deref() {
        let table_schema = schema
            .get_table_schema(table, target_schema)
            .await
            .with_context(|| format!("Failed to describe table {}", table))?;
        println!("{}", serde_json::to_string_pretty(&table_schema)?);
    }

    Ok(())
}
