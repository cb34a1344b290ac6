// SQLite catalog queries over sqlite_master and the table-valued pragmas.
// Table and index names are bound as pragma arguments, never spliced into SQL.
use std::sync::Arc;

use crate::error::SchemaResult;
use crate::executor::{CatalogExecutor, CatalogRow};
use crate::models::{ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, TableSchema};
use crate::services::aggregator::build_table_schema;
use crate::services::database::adapter::{Operation, SchemaDriver};
use crate::services::database::type_map::unify;
use crate::services::database::Platform;
use crate::services::query_builder::Select;

/// SQLite exposes a single implicit schema
const MAIN_SCHEMA: &str = "main";

const CAPABILITIES: &[Operation] = &[
    Operation::ListDatabases,
    Operation::ListViews,
    Operation::ListIndexes,
    Operation::ListConstraints,
    Operation::GetTableSchema,
    Operation::GetDatabaseVersion,
];

pub struct SqliteDriver {
    executor: Arc<dyn CatalogExecutor>,
}

impl SqliteDriver {
    pub fn new(executor: Arc<dyn CatalogExecutor>) -> Self {
        Self { executor }
    }

    async fn pragma(&self, pragma: &str, argument: &str) -> SchemaResult<Vec<CatalogRow>> {
        let sql = format!("SELECT * FROM {}(?1)", pragma);
        self.executor.fetch_all(&sql, &[argument.to_string()]).await
    }

    async fn list_master(&self, object_type: &str) -> SchemaResult<Vec<String>> {
        let query = Select::from("sqlite_master")
            .column("name")
            .filter_eq("type", object_type)
            .filter_not_like("name", "sqlite_%");
        let (sql, params) = query.build(Platform::Sqlite);
        let rows = self.executor.fetch_all(&sql, &params).await?;
        Ok(rows.iter().filter_map(|r| r.text("name")).collect())
    }

    /// `INTEGER PRIMARY KEY` makes the column an alias of the rowid, which
    /// the engine fills on insert with or without the AUTOINCREMENT keyword.
    /// Members of a composite key never alias the rowid.
    fn is_rowid_alias(row: &CatalogRow, pk_columns: usize) -> bool {
        row.int("pk") == Some(1)
            && pk_columns == 1
            && row.text_or_default("type").eq_ignore_ascii_case("integer")
    }

    /// Prefer the pragma's `origin` column; fall back to the autoindex naming
    /// convention when the engine does not report it.
    fn is_primary_index(row: &CatalogRow, table: &str) -> bool {
        match row.text("origin") {
            Some(origin) => origin == "pk",
            None => row.text_or_default("name") == format!("sqlite_autoindex_{}_1", table),
        }
    }
}

#[async_trait::async_trait]
impl SchemaDriver for SqliteDriver {
    fn platform(&self) -> Platform {
        Platform::Sqlite
    }

    fn capabilities(&self) -> &'static [Operation] {
        CAPABILITIES
    }

    async fn list_databases(&self) -> SchemaResult<Vec<String>> {
        Ok(vec![MAIN_SCHEMA.to_string()])
    }

    async fn list_tables(&self, _schema: Option<&str>) -> SchemaResult<Vec<String>> {
        self.list_master("table").await
    }

    async fn list_views(&self, _schema: Option<&str>) -> SchemaResult<Vec<String>> {
        self.list_master("view").await
    }

    async fn list_columns(
        &self,
        table: &str,
        _schema: Option<&str>,
    ) -> SchemaResult<Vec<ColumnDescriptor>> {
        tracing::debug!("Listing SQLite columns for {}", table);
        let rows = self.pragma("pragma_table_info", table).await?;
        let pk_columns = rows.iter().filter(|r| r.int("pk").unwrap_or(0) > 0).count();

        Ok(rows
            .iter()
            .map(|row| {
                let raw_type = row.text_or_default("type");
                let lookup = if raw_type.is_empty() { "text" } else { raw_type.as_str() };
                let (db_type, general_type) = unify(Platform::Sqlite, lookup);

                ColumnDescriptor {
                    name: row.text_or_default("name"),
                    allow_null: row.int("notnull") == Some(0),
                    auto_increment: Self::is_rowid_alias(row, pk_columns),
                    comment: String::new(),
                    raw_type,
                    db_type,
                    general_type,
                    default_value: row.value("dflt_value"),
                    enum_values: Vec::new(),
                    is_primary_key: row.int("pk").unwrap_or(0) > 0,
                    precision: None,
                    scale: None,
                    size: None,
                    unsigned: false,
                }
            })
            .collect())
    }

    async fn list_indexes(
        &self,
        table: &str,
        _schema: Option<&str>,
    ) -> SchemaResult<Vec<IndexDescriptor>> {
        tracing::debug!("Listing SQLite indexes for {}", table);
        let index_rows = self.pragma("pragma_index_list", table).await?;

        let mut indexes = Vec::new();
        for index in &index_rows {
            let name = index.text_or_default("name");
            let is_unique = index.flag("unique");
            let is_primary = Self::is_primary_index(index, table);

            let mut columns = self.pragma("pragma_index_info", &name).await?;
            columns.sort_by_key(|c| c.int("seqno").unwrap_or(0));
            for column in &columns {
                indexes.push(IndexDescriptor {
                    name: name.clone(),
                    column_name: column.text_or_default("name"),
                    is_unique,
                    is_primary,
                });
            }
        }

        Ok(indexes)
    }

    async fn list_constraints(
        &self,
        table: &str,
        _schema: Option<&str>,
    ) -> SchemaResult<Vec<ForeignKeyDescriptor>> {
        tracing::debug!("Listing SQLite foreign keys for {}", table);
        let rows = self.pragma("pragma_foreign_key_list", table).await?;

        // SQLite does not name foreign key constraints
        Ok(rows
            .iter()
            .map(|row| ForeignKeyDescriptor {
                constraint_name: None,
                column_name: row.text_or_default("from"),
                referenced_table_name: row.text_or_default("table"),
                referenced_column_name: row.text_or_default("to"),
                on_update: row.text("on_update"),
                on_delete: row.text("on_delete"),
            })
            .collect())
    }

    async fn get_table_schema(
        &self,
        table: &str,
        _schema: Option<&str>,
    ) -> SchemaResult<TableSchema> {
        build_table_schema(self, table, None).await
    }

    async fn get_database_version(&self) -> SchemaResult<String> {
        let rows = self
            .executor
            .fetch_all("SELECT sqlite_version() AS version", &[])
            .await?;
        Ok(rows
            .first()
            .and_then(|r| r.text("version"))
            .unwrap_or_default())
    }

    async fn default_schema_name(&self) -> SchemaResult<String> {
        Ok(MAIN_SCHEMA.to_string())
    }
}
