// MySQL/MariaDB catalog queries over information_schema
use std::sync::Arc;

use crate::error::SchemaResult;
use crate::executor::{CatalogExecutor, CatalogRow};
use crate::models::{ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, TableSchema};
use crate::services::aggregator::build_table_schema;
use crate::services::database::adapter::{Operation, SchemaDriver};
use crate::services::database::type_map::{is_unsigned, parse_enum_values, unify};
use crate::services::database::Platform;
use crate::services::query_builder::Select;

const CAPABILITIES: &[Operation] = &[
    Operation::ListDatabases,
    Operation::ListViews,
    Operation::ListIndexes,
    Operation::ListConstraints,
    Operation::GetTableSchema,
    Operation::GetDatabaseVersion,
];

pub struct MySqlDriver {
    executor: Arc<dyn CatalogExecutor>,
}

impl MySqlDriver {
    pub fn new(executor: Arc<dyn CatalogExecutor>) -> Self {
        Self { executor }
    }

    /// Filter on the given schema, or on the connected database when omitted
    fn in_schema(query: Select, column: &str, schema: Option<&str>) -> Select {
        match schema {
            Some(s) => query.filter_eq(column, s),
            None => query.filter_eq_expr(column, "DATABASE()"),
        }
    }

    async fn run(&self, query: Select) -> SchemaResult<Vec<CatalogRow>> {
        let (sql, params) = query.build(Platform::MySql);
        self.executor.fetch_all(&sql, &params).await
    }

    fn to_column(row: &CatalogRow) -> ColumnDescriptor {
        let data_type = row.text_or_default("DATA_TYPE");
        let column_type = row.text("COLUMN_TYPE").unwrap_or_else(|| data_type.clone());
        let (db_type, general_type) = unify(Platform::MySql, &data_type);

        ColumnDescriptor {
            name: row.text_or_default("COLUMN_NAME"),
            allow_null: row.text("IS_NULLABLE").as_deref() == Some("YES"),
            auto_increment: row
                .text_or_default("EXTRA")
                .to_lowercase()
                .contains("auto_increment"),
            comment: row.text_or_default("COLUMN_COMMENT"),
            raw_type: column_type.clone(),
            db_type,
            general_type,
            default_value: row.value("COLUMN_DEFAULT"),
            enum_values: parse_enum_values(&column_type),
            is_primary_key: row.text("COLUMN_KEY").as_deref() == Some("PRI"),
            precision: row.nonzero_int("NUMERIC_PRECISION"),
            scale: row.nonzero_int("NUMERIC_SCALE"),
            size: row.nonzero_int("CHARACTER_MAXIMUM_LENGTH"),
            unsigned: is_unsigned(&column_type),
        }
    }
}

#[async_trait::async_trait]
impl SchemaDriver for MySqlDriver {
    fn platform(&self) -> Platform {
        Platform::MySql
    }

    fn capabilities(&self) -> &'static [Operation] {
        CAPABILITIES
    }

    async fn list_databases(&self) -> SchemaResult<Vec<String>> {
        let rows = self
            .run(Select::from("information_schema.schemata").column("schema_name"))
            .await?;
        Ok(rows.iter().filter_map(|r| r.text("schema_name")).collect())
    }

    async fn list_tables(&self, schema: Option<&str>) -> SchemaResult<Vec<String>> {
        let query = Select::from("information_schema.tables")
            .column("table_name")
            .filter_eq("table_type", "BASE TABLE");
        let rows = self.run(Self::in_schema(query, "table_schema", schema)).await?;
        Ok(rows.iter().filter_map(|r| r.text("table_name")).collect())
    }

    async fn list_views(&self, schema: Option<&str>) -> SchemaResult<Vec<String>> {
        let query = Select::from("information_schema.views").column("table_name");
        let rows = self.run(Self::in_schema(query, "table_schema", schema)).await?;
        Ok(rows.iter().filter_map(|r| r.text("table_name")).collect())
    }

    async fn list_columns(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<Vec<ColumnDescriptor>> {
        tracing::debug!("Listing MySQL columns for {} (schema: {:?})", table, schema);
        let query = Select::from("information_schema.columns").columns(&[
            "COLUMN_NAME",
            "COLUMN_TYPE",
            "DATA_TYPE",
            "IS_NULLABLE",
            "COLUMN_DEFAULT",
            "COLUMN_KEY",
            "EXTRA",
            "COLUMN_COMMENT",
            "CHARACTER_MAXIMUM_LENGTH",
            "NUMERIC_PRECISION",
            "NUMERIC_SCALE",
        ]);
        let query = Self::in_schema(query, "table_schema", schema)
            .filter_eq("table_name", table)
            .order_by("ORDINAL_POSITION");

        let rows = self.run(query).await?;
        Ok(rows.iter().map(Self::to_column).collect())
    }

    async fn list_indexes(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<Vec<IndexDescriptor>> {
        tracing::debug!("Listing MySQL indexes for {} (schema: {:?})", table, schema);
        let query = Select::from("information_schema.statistics")
            .column_as("COLUMN_NAME", "column_name")
            .column_as("INDEX_NAME", "index_name")
            .column_as("NOT NON_UNIQUE", "index_is_unique")
            .column_as("INDEX_NAME = 'PRIMARY'", "index_is_primary");
        let query = Self::in_schema(query, "table_schema", schema);
        let query = Self::in_schema(query, "index_schema", schema)
            .filter_eq("table_name", table)
            .order_by("INDEX_NAME")
            .order_by("SEQ_IN_INDEX");

        let rows = self.run(query).await?;
        Ok(rows
            .iter()
            .map(|row| IndexDescriptor {
                name: row.text_or_default("index_name"),
                column_name: row.text_or_default("column_name"),
                is_unique: row.flag("index_is_unique"),
                is_primary: row.flag("index_is_primary"),
            })
            .collect())
    }

    async fn list_constraints(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<Vec<ForeignKeyDescriptor>> {
        tracing::debug!("Listing MySQL foreign keys for {} (schema: {:?})", table, schema);
        let query = Select::from("information_schema.referential_constraints rc")
            .column_as("kcu.constraint_name", "constraint_name")
            .column_as("kcu.column_name", "column_name")
            .column_as("kcu.referenced_table_name", "referenced_table_name")
            .column_as("kcu.referenced_column_name", "referenced_column_name")
            .column_as("rc.update_rule", "on_update")
            .column_as("rc.delete_rule", "on_delete")
            .join(
                "information_schema.key_column_usage kcu",
                &[
                    ("kcu.constraint_schema", "rc.constraint_schema"),
                    ("kcu.constraint_name", "rc.constraint_name"),
                ],
            );
        let query = Self::in_schema(query, "rc.constraint_schema", schema);
        let query = Self::in_schema(query, "kcu.table_schema", schema)
            .filter_eq("rc.table_name", table)
            .filter_eq("kcu.table_name", table)
            .order_by("kcu.constraint_name")
            .order_by("kcu.ordinal_position");

        let rows = self.run(query).await?;
        Ok(rows
            .iter()
            .map(|row| ForeignKeyDescriptor {
                constraint_name: row.text("constraint_name"),
                column_name: row.text_or_default("column_name"),
                referenced_table_name: row.text_or_default("referenced_table_name"),
                referenced_column_name: row.text_or_default("referenced_column_name"),
                on_update: row.text("on_update"),
                on_delete: row.text("on_delete"),
            })
            .collect())
    }

    async fn get_table_schema(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<TableSchema> {
        build_table_schema(self, table, schema).await
    }

    async fn get_database_version(&self) -> SchemaResult<String> {
        let rows = self
            .executor
            .fetch_all("SELECT VERSION() AS version", &[])
            .await?;
        Ok(rows
            .first()
            .and_then(|r| r.text("version"))
            .unwrap_or_default())
    }

    async fn default_schema_name(&self) -> SchemaResult<String> {
        let rows = self
            .executor
            .fetch_all("SELECT DATABASE() AS db", &[])
            .await?;
        Ok(rows.first().and_then(|r| r.text("db")).unwrap_or_default())
    }
}
