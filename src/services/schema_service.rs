use crate::error::SchemaResult;
use crate::executor::CatalogExecutor;
use crate::models::{ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, TableSchema};
use crate::services::database::{create_driver, Operation, Platform, SchemaDriver};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Schema introspection entry point for one connection.
///
/// The platform name may be a canonical name (`mysql`, `postgres`, `sqlite`,
/// `sqlsrv`) or a driver alias such as `pg`, `mariadb` or `mssql`. It is
/// resolved on the first operation and the bound driver is reused for every
/// later call. A failed resolution is not cached and never reaches the
/// executor.
pub struct CrossSchema {
    platform: Option<String>,
    executor: Arc<dyn CatalogExecutor>,
    driver: OnceCell<Box<dyn SchemaDriver>>,
}

impl CrossSchema {
    pub fn new(platform: Option<&str>, executor: Arc<dyn CatalogExecutor>) -> Self {
        Self {
            platform: platform.map(|p| Platform::canonical_name(p).to_string()),
            executor,
            driver: OnceCell::new(),
        }
    }

    /// Platform name as given, after alias mapping
    pub fn platform_name(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    fn driver(&self) -> SchemaResult<&dyn SchemaDriver> {
        let driver = self.driver.get_or_try_init(|| {
            let platform = Platform::resolve(self.platform.as_deref())?;
            tracing::info!("Binding schema driver for platform {}", platform);
            Ok::<_, crate::error::SchemaError>(create_driver(platform, self.executor.clone()))
        })?;
        Ok(driver.as_ref())
    }

    fn driver_for(&self, operation: Operation) -> SchemaResult<&dyn SchemaDriver> {
        let driver = self.driver()?;
        if !driver.supports(operation) {
            tracing::warn!("{} requested on {}", operation, driver.platform());
            return Err(driver.not_implemented(operation));
        }
        Ok(driver)
    }

    /// Resolved platform, binding the driver if needed
    pub fn platform(&self) -> SchemaResult<Platform> {
        Ok(self.driver()?.platform())
    }

    pub async fn list_databases(&self) -> SchemaResult<Vec<String>> {
        self.driver_for(Operation::ListDatabases)?
            .list_databases()
            .await
    }

    pub async fn list_tables(&self, schema: Option<&str>) -> SchemaResult<Vec<String>> {
        self.driver_for(Operation::ListTables)?
            .list_tables(schema)
            .await
    }

    pub async fn list_views(&self, schema: Option<&str>) -> SchemaResult<Vec<String>> {
        self.driver_for(Operation::ListViews)?
            .list_views(schema)
            .await
    }

    pub async fn list_columns(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<Vec<ColumnDescriptor>> {
        self.driver_for(Operation::ListColumns)?
            .list_columns(table, schema)
            .await
    }

    pub async fn list_indexes(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<Vec<IndexDescriptor>> {
        self.driver_for(Operation::ListIndexes)?
            .list_indexes(table, schema)
            .await
    }

    pub async fn list_constraints(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<Vec<ForeignKeyDescriptor>> {
        self.driver_for(Operation::ListConstraints)?
            .list_constraints(table, schema)
            .await
    }

    pub async fn get_table_schema(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<TableSchema> {
        self.driver_for(Operation::GetTableSchema)?
            .get_table_schema(table, schema)
            .await
    }

    pub async fn get_database_version(&self) -> SchemaResult<String> {
        self.driver_for(Operation::GetDatabaseVersion)?
            .get_database_version()
            .await
    }
}
