// SQL Server catalog queries over INFORMATION_SCHEMA and the sys views.
// Raw statements bind @P1 = table and @P2 = schema.
use std::sync::Arc;

use crate::error::SchemaResult;
use crate::executor::{CatalogExecutor, CatalogRow};
use crate::models::{ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, TableSchema};
use crate::services::aggregator::build_table_schema;
use crate::services::database::adapter::{Operation, SchemaDriver};
use crate::services::database::type_map::unify;
use crate::services::database::Platform;
use crate::services::query_builder::Select;

const DEFAULT_SCHEMA: &str = "dbo";

// listDatabases has no SQL Server equivalent here
const CAPABILITIES: &[Operation] = &[
    Operation::ListViews,
    Operation::ListIndexes,
    Operation::ListConstraints,
    Operation::GetTableSchema,
    Operation::GetDatabaseVersion,
];

const COLUMNS_SQL: &str = r#"SELECT
    [t1].[COLUMN_NAME] AS column_name,
    [t1].[IS_NULLABLE] AS is_nullable,
    [t1].[DATA_TYPE] AS data_type,
    CASE WHEN [t1].[DATA_TYPE] IN ('char','varchar','nchar','nvarchar','binary','varbinary')
              AND [t1].[CHARACTER_MAXIMUM_LENGTH] IS NOT NULL
              AND [t1].[CHARACTER_MAXIMUM_LENGTH] <> -1
         THEN [t1].[DATA_TYPE] + '(' + CAST([t1].[CHARACTER_MAXIMUM_LENGTH] AS varchar(10)) + ')'
         ELSE [t1].[DATA_TYPE]
    END AS raw_type,
    [t1].[COLUMN_DEFAULT] AS column_default,
    [t1].[CHARACTER_MAXIMUM_LENGTH] AS size,
    [t1].[NUMERIC_PRECISION] AS numeric_precision,
    [t1].[NUMERIC_SCALE] AS numeric_scale,
    COLUMNPROPERTY(OBJECT_ID(QUOTENAME([t1].[TABLE_SCHEMA]) + '.' + QUOTENAME([t1].[TABLE_NAME])), [t1].[COLUMN_NAME], 'IsIdentity') AS is_identity,
    (
        SELECT CONVERT(nvarchar(4000), [t2].[value])
        FROM [sys].[extended_properties] AS [t2]
        WHERE [t2].[class] = 1
          AND [t2].[name] = 'MS_Description'
          AND [t2].[major_id] = OBJECT_ID(QUOTENAME([t1].[TABLE_SCHEMA]) + '.' + QUOTENAME([t1].[TABLE_NAME]))
          AND [t2].[minor_id] = COLUMNPROPERTY(OBJECT_ID(QUOTENAME([t1].[TABLE_SCHEMA]) + '.' + QUOTENAME([t1].[TABLE_NAME])), [t1].[COLUMN_NAME], 'ColumnID')
    ) AS comment
FROM [INFORMATION_SCHEMA].[COLUMNS] AS [t1]
WHERE [t1].[TABLE_NAME] = @P1 AND [t1].[TABLE_SCHEMA] = @P2
ORDER BY [t1].[ORDINAL_POSITION]"#;

const INDEXES_SQL: &str = r#"SELECT
    [i].[name] AS index_name,
    [iccol].[name] AS column_name,
    [i].[is_unique] AS index_is_unique,
    [i].[is_primary_key] AS index_is_primary
FROM [sys].[indexes] AS [i]
JOIN [sys].[index_columns] AS [ic]
  ON [ic].[object_id] = [i].[object_id] AND [ic].[index_id] = [i].[index_id]
JOIN [sys].[columns] AS [iccol]
  ON [iccol].[object_id] = [ic].[object_id] AND [iccol].[column_id] = [ic].[column_id]
WHERE [i].[object_id] = OBJECT_ID(QUOTENAME(@P2) + '.' + QUOTENAME(@P1))
  AND [ic].[key_ordinal] > 0
ORDER BY [i].[index_id], [ic].[key_ordinal]"#;

const FOREIGN_KEYS_SQL: &str = r#"SELECT
    [fk].[name] AS fk_name,
    [cp].[name] AS fk_column_name,
    OBJECT_NAME([fk].[referenced_object_id]) AS uq_table_name,
    [cr].[name] AS uq_column_name,
    [fk].[update_referential_action_desc] AS on_update,
    [fk].[delete_referential_action_desc] AS on_delete
FROM [sys].[foreign_keys] AS [fk]
INNER JOIN [sys].[foreign_key_columns] AS [fkc]
  ON [fk].[object_id] = [fkc].[constraint_object_id]
INNER JOIN [sys].[columns] AS [cp]
  ON [fk].[parent_object_id] = [cp].[object_id] AND [fkc].[parent_column_id] = [cp].[column_id]
INNER JOIN [sys].[columns] AS [cr]
  ON [fk].[referenced_object_id] = [cr].[object_id] AND [fkc].[referenced_column_id] = [cr].[column_id]
WHERE [fk].[parent_object_id] = OBJECT_ID(QUOTENAME(@P2) + '.' + QUOTENAME(@P1))
ORDER BY [fk].[name], [fkc].[constraint_column_id]"#;

const VERSION_SQL: &str =
    "SELECT CAST(SERVERPROPERTY('ProductVersion') AS nvarchar(128)) AS ProductVersion";

pub struct SqlSrvDriver {
    executor: Arc<dyn CatalogExecutor>,
}

impl SqlSrvDriver {
    pub fn new(executor: Arc<dyn CatalogExecutor>) -> Self {
        Self { executor }
    }

    fn params(table: &str, schema: Option<&str>) -> Vec<String> {
        vec![
            table.to_string(),
            schema.unwrap_or(DEFAULT_SCHEMA).to_string(),
        ]
    }

    async fn list_table_type(
        &self,
        table_type: &str,
        schema: Option<&str>,
    ) -> SchemaResult<Vec<String>> {
        let query = Select::from("INFORMATION_SCHEMA.TABLES")
            .column_as("TABLE_NAME", "table_name")
            .filter_eq("TABLE_SCHEMA", schema.unwrap_or(DEFAULT_SCHEMA))
            .filter_in("TABLE_TYPE", &[table_type])
            .order_by("TABLE_NAME");
        let (sql, params) = query.build(Platform::SqlSrv);
        let rows = self.executor.fetch_all(&sql, &params).await?;
        Ok(rows.iter().filter_map(|r| r.text("table_name")).collect())
    }

    async fn primary_key_columns(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<Vec<String>> {
        let query = Select::from("INFORMATION_SCHEMA.KEY_COLUMN_USAGE AS kcu")
            .column_as("kcu.COLUMN_NAME", "field_name")
            .join(
                "INFORMATION_SCHEMA.TABLE_CONSTRAINTS AS tc",
                &[
                    ("kcu.TABLE_SCHEMA", "tc.TABLE_SCHEMA"),
                    ("kcu.TABLE_NAME", "tc.TABLE_NAME"),
                    ("kcu.CONSTRAINT_NAME", "tc.CONSTRAINT_NAME"),
                ],
            )
            .filter_eq("kcu.TABLE_NAME", table)
            .filter_eq("kcu.TABLE_SCHEMA", schema.unwrap_or(DEFAULT_SCHEMA))
            .filter_eq("tc.CONSTRAINT_TYPE", "PRIMARY KEY");
        let (sql, params) = query.build(Platform::SqlSrv);
        let rows = self.executor.fetch_all(&sql, &params).await?;
        Ok(rows.iter().filter_map(|r| r.text("field_name")).collect())
    }

    fn to_column(row: &CatalogRow, primary_keys: &[String]) -> ColumnDescriptor {
        let name = row.text_or_default("column_name");
        let raw_type = row
            .text("raw_type")
            .or_else(|| row.text("data_type"))
            .unwrap_or_else(|| "text".to_string());
        let (db_type, general_type) = unify(Platform::SqlSrv, &raw_type);

        ColumnDescriptor {
            allow_null: row.text("is_nullable").as_deref() == Some("YES"),
            auto_increment: row.int("is_identity") == Some(1),
            comment: row.text_or_default("comment"),
            db_type,
            general_type,
            default_value: row.value("column_default"),
            enum_values: Vec::new(),
            is_primary_key: primary_keys.contains(&name),
            precision: row.nonzero_int("numeric_precision"),
            scale: row.nonzero_int("numeric_scale"),
            size: row.nonzero_int("size").filter(|s| *s > 0),
            unsigned: false,
            raw_type,
            name,
        }
    }
}

#[async_trait::async_trait]
impl SchemaDriver for SqlSrvDriver {
    fn platform(&self) -> Platform {
        Platform::SqlSrv
    }

    fn capabilities(&self) -> &'static [Operation] {
        CAPABILITIES
    }

    async fn list_tables(&self, schema: Option<&str>) -> SchemaResult<Vec<String>> {
        self.list_table_type("BASE TABLE", schema).await
    }

    async fn list_views(&self, schema: Option<&str>) -> SchemaResult<Vec<String>> {
        self.list_table_type("VIEW", schema).await
    }

    async fn list_columns(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<Vec<ColumnDescriptor>> {
        tracing::debug!("Listing SQL Server columns for {} (schema: {:?})", table, schema);
        let primary_keys = self.primary_key_columns(table, schema).await?;
        let rows = self
            .executor
            .fetch_all(COLUMNS_SQL, &Self::params(table, schema))
            .await?;

        Ok(rows
            .iter()
            .map(|row| Self::to_column(row, &primary_keys))
            .collect())
    }

    async fn list_indexes(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<Vec<IndexDescriptor>> {
        let rows = self
            .executor
            .fetch_all(INDEXES_SQL, &Self::params(table, schema))
            .await?;

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
        let rows = self
            .executor
            .fetch_all(FOREIGN_KEYS_SQL, &Self::params(table, schema))
            .await?;

        Ok(rows
            .iter()
            .map(|row| ForeignKeyDescriptor {
                constraint_name: row.text("fk_name"),
                column_name: row.text_or_default("fk_column_name"),
                referenced_table_name: row.text_or_default("uq_table_name"),
                referenced_column_name: row.text_or_default("uq_column_name"),
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
        let rows = self.executor.fetch_all(VERSION_SQL, &[]).await?;
        Ok(rows
            .first()
            .and_then(|r| r.text("ProductVersion"))
            .unwrap_or_default())
    }

    async fn default_schema_name(&self) -> SchemaResult<String> {
        Ok(DEFAULT_SCHEMA.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::executor::mock::MockExecutor;
    use crate::models::{DbType, GeneralType};
    use serde_json::json;

    fn orders_executor() -> MockExecutor {
        MockExecutor::new()
            .respond(
                "FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE",
                vec![json!({"field_name": "id"})],
            )
            .respond(
                "FROM [INFORMATION_SCHEMA].[COLUMNS]",
                vec![
                    json!({
                        "column_name": "id", "is_nullable": "NO", "data_type": "int",
                        "raw_type": "int", "column_default": null, "size": null,
                        "numeric_precision": 10, "numeric_scale": 0,
                        "is_identity": 1, "comment": null
                    }),
                    json!({
                        "column_name": "reference", "is_nullable": "YES", "data_type": "nvarchar",
                        "raw_type": "nvarchar(40)", "column_default": null, "size": 40,
                        "numeric_precision": null, "numeric_scale": null,
                        "is_identity": 0, "comment": "customer reference"
                    }),
                    json!({
                        "column_name": "total", "is_nullable": "NO", "data_type": "money",
                        "raw_type": "money", "column_default": "((0))", "size": null,
                        "numeric_precision": 19, "numeric_scale": 4,
                        "is_identity": 0, "comment": null
                    }),
                ],
            )
            .respond(
                "FROM [sys].[indexes]",
                vec![
                    json!({"index_name": "PK_orders", "column_name": "id",
                           "index_is_unique": true, "index_is_primary": true}),
                    json!({"index_name": "IX_orders_reference", "column_name": "reference",
                           "index_is_unique": false, "index_is_primary": false}),
                ],
            )
            .respond(
                "FROM [sys].[foreign_keys]",
                vec![json!({
                    "fk_name": "FK_orders_customers", "fk_column_name": "customer_id",
                    "uq_table_name": "customers", "uq_column_name": "id",
                    "on_update": "NO_ACTION", "on_delete": "CASCADE"
                })],
            )
    }

    #[tokio::test]
    async fn test_orders_table_schema() {
        let executor = Arc::new(orders_executor());
        let driver = SqlSrvDriver::new(executor.clone());

        let schema = driver.get_table_schema("orders", None).await.unwrap();

        assert_eq!(schema.schema_name, "dbo");
        assert_eq!(schema.primary_keys, vec!["id"]);
        assert_eq!(schema.sequence_name.as_deref(), Some("id"));
        assert_eq!(schema.indexes.len(), 1);
        assert_eq!(schema.indexes[0].name, "IX_orders_reference");

        let fk = &schema.foreign_keys[0];
        assert_eq!(fk.constraint_name.as_deref(), Some("FK_orders_customers"));
        assert_eq!(fk.on_delete.as_deref(), Some("CASCADE"));

        let reference = schema.column("reference").unwrap();
        assert!(reference.allow_null);
        assert_eq!(reference.raw_type, "nvarchar(40)");
        assert_eq!(reference.db_type, DbType::String);
        assert_eq!(reference.size, Some(40));
        assert_eq!(reference.comment, "customer reference");

        let total = schema.column("total").unwrap();
        assert_eq!(total.db_type, DbType::Money);
        assert_eq!(total.general_type, GeneralType::String);
        assert_eq!(total.precision, Some(19));
        assert_eq!(total.scale, Some(4));

        for call in executor
            .calls()
            .iter()
            .filter(|c| !c.sql.contains("KEY_COLUMN_USAGE"))
        {
            assert_eq!(call.params, vec!["orders", "dbo"]);
        }
    }

    #[tokio::test]
    async fn test_explicit_schema_is_bound() {
        let executor = Arc::new(MockExecutor::new());
        let driver = SqlSrvDriver::new(executor.clone());

        driver.list_constraints("orders", Some("sales")).await.unwrap();
        driver.list_tables(Some("sales")).await.unwrap();

        let calls = executor.calls();
        assert_eq!(calls[0].params, vec!["orders", "sales"]);
        assert!(calls[0].sql.contains("QUOTENAME(@P2) + '.' + QUOTENAME(@P1)"));
        assert_eq!(calls[1].params, vec!["sales", "BASE TABLE"]);
        assert!(calls[1].sql.contains("TABLE_TYPE IN (@P2)"));
        assert!(calls[1].sql.ends_with("ORDER BY TABLE_NAME"));
    }

    #[tokio::test]
    async fn test_list_databases_not_implemented() {
        let driver = SqlSrvDriver::new(Arc::new(MockExecutor::new()));
        let err = driver.list_databases().await.unwrap_err();

        assert!(matches!(err, SchemaError::NotImplementedForPlatform { .. }));
        assert_eq!(err.to_string(), "listDatabases not implemented for sqlsrv");
        assert!(!driver.supports(Operation::ListDatabases));
        assert!(driver.supports(Operation::ListTables));
    }

    #[tokio::test]
    async fn test_views_and_version() {
        let executor = Arc::new(
            MockExecutor::new()
                .respond(
                    "FROM INFORMATION_SCHEMA.TABLES",
                    vec![json!({"table_name": "v_active_orders"})],
                )
                .respond("SERVERPROPERTY", vec![json!({"ProductVersion": "16.0.1000.6"})]),
        );
        let driver = SqlSrvDriver::new(executor.clone());

        assert_eq!(driver.list_views(None).await.unwrap(), vec!["v_active_orders"]);
        assert_eq!(executor.calls()[0].params, vec!["dbo", "VIEW"]);
        assert_eq!(driver.get_database_version().await.unwrap(), "16.0.1000.6");
    }
}
