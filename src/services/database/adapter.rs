// Catalog driver trait for multi-platform schema introspection
use crate::error::{SchemaError, SchemaResult};
use crate::models::{ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, TableSchema};
use crate::services::database::Platform;
use std::fmt;

/// Public introspection operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListDatabases,
    ListTables,
    ListViews,
    ListColumns,
    ListIndexes,
    ListConstraints,
    GetTableSchema,
    GetDatabaseVersion,
}

impl Operation {
    /// Operations every driver must provide
    pub const MANDATORY: [Operation; 2] = [Operation::ListTables, Operation::ListColumns];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListDatabases => "listDatabases",
            Operation::ListTables => "listTables",
            Operation::ListViews => "listViews",
            Operation::ListColumns => "listColumns",
            Operation::ListIndexes => "listIndexes",
            Operation::ListConstraints => "listConstraints",
            Operation::GetTableSchema => "getTableSchema",
            Operation::GetDatabaseVersion => "getDatabaseVersion",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog query set for one platform.
///
/// `list_tables` and `list_columns` are mandatory. Every other operation is
/// optional: a driver declares what it provides through [`capabilities`],
/// and the default bodies fail with `NotImplementedForPlatform`.
///
/// [`capabilities`]: SchemaDriver::capabilities
#[async_trait::async_trait]
pub trait SchemaDriver: Send + Sync {
    fn platform(&self) -> Platform;

    /// Optional operations this driver implements
    fn capabilities(&self) -> &'static [Operation];

    fn supports(&self, operation: Operation) -> bool {
        Operation::MANDATORY.contains(&operation) || self.capabilities().contains(&operation)
    }

    fn not_implemented(&self, operation: Operation) -> SchemaError {
        SchemaError::not_implemented(operation.as_str(), self.platform().as_str())
    }

    async fn list_databases(&self) -> SchemaResult<Vec<String>> {
        Err(self.not_implemented(Operation::ListDatabases))
    }

    async fn list_tables(&self, schema: Option<&str>) -> SchemaResult<Vec<String>>;

    async fn list_views(&self, _schema: Option<&str>) -> SchemaResult<Vec<String>> {
        Err(self.not_implemented(Operation::ListViews))
    }

    async fn list_columns(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<Vec<ColumnDescriptor>>;

    async fn list_indexes(
        &self,
        _table: &str,
        _schema: Option<&str>,
    ) -> SchemaResult<Vec<IndexDescriptor>> {
        Err(self.not_implemented(Operation::ListIndexes))
    }

    async fn list_constraints(
        &self,
        _table: &str,
        _schema: Option<&str>,
    ) -> SchemaResult<Vec<ForeignKeyDescriptor>> {
        Err(self.not_implemented(Operation::ListConstraints))
    }

    async fn get_table_schema(
        &self,
        _table: &str,
        _schema: Option<&str>,
    ) -> SchemaResult<TableSchema> {
        Err(self.not_implemented(Operation::GetTableSchema))
    }

    async fn get_database_version(&self) -> SchemaResult<String> {
        Err(self.not_implemented(Operation::GetDatabaseVersion))
    }

    /// Schema name reported by `get_table_schema` when none was given
    async fn default_schema_name(&self) -> SchemaResult<String>;
}
