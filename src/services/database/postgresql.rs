// PostgreSQL catalog queries over pg_catalog and information_schema
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::SchemaResult;
use crate::executor::{CatalogExecutor, CatalogRow};
use crate::models::{ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, TableSchema};
use crate::services::aggregator::build_table_schema;
use crate::services::database::adapter::{Operation, SchemaDriver};
use crate::services::database::type_map::unify;
use crate::services::database::Platform;
use crate::services::query_builder::Select;
use crate::services::version::{extract_postgres_version, version_compare};

const DEFAULT_SCHEMA: &str = "public";

/// First server version exposing identity columns to the auto-increment check
const IDENTITY_MIN_VERSION: &str = "12.0";

const CAPABILITIES: &[Operation] = &[
    Operation::ListDatabases,
    Operation::ListViews,
    Operation::ListIndexes,
    Operation::ListConstraints,
    Operation::GetTableSchema,
    Operation::GetDatabaseVersion,
];

const COLUMNS_SQL: &str = r#"
SELECT
    a.attname AS column_name,
    COALESCE(td.typname, tb.typname, t.typname)::text AS data_type,
    COALESCE(td.typtype, tb.typtype, t.typtype)::text AS type_type,
    pg_catalog.col_description(c.oid, a.attnum) AS column_comment,
    NOT a.attnotnull AS is_nullable,
    CAST(pg_get_expr(ad.adbin, ad.adrelid) AS varchar) AS column_default,
    (COALESCE(pg_get_expr(ad.adbin, ad.adrelid) ~ 'nextval', false){identity}) AS is_autoinc,
    CASE WHEN COALESCE(td.typtype, tb.typtype, t.typtype) = 'e'::char THEN
        array_to_json(
            (SELECT array_agg(enumlabel ORDER BY enumsortorder) FROM pg_enum
             WHERE enumtypid = COALESCE(td.oid, tb.oid, a.atttypid)))::text
    ELSE NULL END AS enum_values,
    CASE a.atttypid
        WHEN 21 THEN 16
        WHEN 23 THEN 32
        WHEN 20 THEN 64
        WHEN 1700 THEN CASE WHEN a.atttypmod = -1 THEN NULL ELSE ((a.atttypmod - 4) >> 16) & 65535 END
        WHEN 700 THEN 24
        WHEN 701 THEN 53
        ELSE NULL
    END AS numeric_precision,
    CASE
        WHEN a.atttypid IN (21, 23, 20) THEN 0
        WHEN a.atttypid = 1700 THEN CASE WHEN a.atttypmod = -1 THEN NULL ELSE (a.atttypmod - 4) & 65535 END
        ELSE NULL
    END AS numeric_scale,
    CAST(information_schema._pg_char_max_length(
        information_schema._pg_truetypid(a, t),
        information_schema._pg_truetypmod(a, t)) AS int4) AS size,
    COALESCE(a.attnum = ANY(ct.conkey), false) AS is_pkey
FROM pg_class c
JOIN pg_namespace d ON d.oid = c.relnamespace
JOIN pg_attribute a ON a.attrelid = c.oid
LEFT JOIN pg_attrdef ad ON a.attrelid = ad.adrelid AND a.attnum = ad.adnum
LEFT JOIN pg_type t ON a.atttypid = t.oid
LEFT JOIN pg_type tb ON (a.attndims > 0 OR t.typcategory = 'A') AND t.typelem > 0 AND t.typelem = tb.oid
    OR t.typbasetype > 0 AND t.typbasetype = tb.oid
LEFT JOIN pg_type td ON t.typndims > 0 AND t.typbasetype > 0 AND tb.typelem = td.oid
LEFT JOIN pg_constraint ct ON ct.conrelid = c.oid AND ct.contype = 'p'
WHERE a.attnum > 0
  AND t.typname != ''
  AND NOT a.attisdropped
  AND c.relname = $1
  AND d.nspname = $2
ORDER BY a.attnum
"#;

const IDENTITY_PREDICATE: &str = " OR a.attidentity != ''";

const INDEXES_SQL: &str = r#"
SELECT
    i.relname AS index_name,
    a.attname AS column_name,
    ix.indisunique AS index_is_unique,
    ix.indisprimary AS index_is_primary
FROM pg_class t
JOIN pg_index ix ON t.oid = ix.indrelid
JOIN pg_class i ON i.oid = ix.indexrelid
JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey)
WHERE t.relname = $1
  AND t.relnamespace = (SELECT oid FROM pg_namespace WHERE nspname = $2)
ORDER BY i.relname, array_position(ix.indkey::int2[], a.attnum)
"#;

const FOREIGN_KEYS_SQL: &str = r#"
SELECT
    con.conname AS constraint_name,
    att.attname AS column_name,
    ref.relname AS referenced_table_name,
    ratt.attname AS referenced_column_name,
    CASE con.confupdtype
        WHEN 'a' THEN 'NO ACTION' WHEN 'r' THEN 'RESTRICT' WHEN 'c' THEN 'CASCADE'
        WHEN 'n' THEN 'SET NULL' WHEN 'd' THEN 'SET DEFAULT' END AS on_update,
    CASE con.confdeltype
        WHEN 'a' THEN 'NO ACTION' WHEN 'r' THEN 'RESTRICT' WHEN 'c' THEN 'CASCADE'
        WHEN 'n' THEN 'SET NULL' WHEN 'd' THEN 'SET DEFAULT' END AS on_delete
FROM pg_constraint con
JOIN pg_class rel ON rel.oid = con.conrelid
JOIN pg_namespace ns ON ns.oid = rel.relnamespace
JOIN pg_class ref ON ref.oid = con.confrelid
CROSS JOIN LATERAL unnest(con.conkey, con.confkey) WITH ORDINALITY AS k(attnum, refnum, ord)
JOIN pg_attribute att ON att.attrelid = con.conrelid AND att.attnum = k.attnum
JOIN pg_attribute ratt ON ratt.attrelid = con.confrelid AND ratt.attnum = k.refnum
WHERE con.contype = 'f'
  AND rel.relname = $1
  AND ns.nspname = $2
ORDER BY con.conname, k.ord
"#;

pub struct PostgresDriver {
    executor: Arc<dyn CatalogExecutor>,
}

impl PostgresDriver {
    pub fn new(executor: Arc<dyn CatalogExecutor>) -> Self {
        Self { executor }
    }

    async fn run(&self, query: Select) -> SchemaResult<Vec<CatalogRow>> {
        let (sql, params) = query.build(Platform::Postgres);
        self.executor.fetch_all(&sql, &params).await
    }

    fn table_params(table: &str, schema: Option<&str>) -> [String; 2] {
        [table.to_string(), schema.unwrap_or(DEFAULT_SCHEMA).to_string()]
    }

    /// Column query for a given server version. Identity columns count as
    /// auto-increment from 12.0 on; older servers only use `nextval` defaults.
    fn columns_sql(version: &str) -> String {
        let identity = if version_compare(version, IDENTITY_MIN_VERSION) != Ordering::Less {
            IDENTITY_PREDICATE
        } else {
            ""
        };
        COLUMNS_SQL.replace("{identity}", identity)
    }

    /// Enum labels arrive as a JSON array, so labels may contain commas
    fn enum_labels(row: &CatalogRow) -> Vec<String> {
        match row.value("enum_values") {
            Some(Value::Array(labels)) => labels
                .iter()
                .filter_map(|l| l.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(text)) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!("Unreadable enum labels {:?}: {}", text, e);
                Vec::new()
            }),
            _ => Vec::new(),
        }
    }

    fn to_column(row: &CatalogRow) -> ColumnDescriptor {
        let data_type = row.text_or_default("data_type");
        let (db_type, general_type) = unify(Platform::Postgres, &data_type);

        let enum_values = Self::enum_labels(row);

        ColumnDescriptor {
            name: row.text_or_default("column_name"),
            allow_null: row.flag("is_nullable"),
            auto_increment: row.flag("is_autoinc"),
            comment: row.text_or_default("column_comment"),
            raw_type: data_type,
            db_type,
            general_type,
            default_value: row.value("column_default"),
            enum_values,
            is_primary_key: row.flag("is_pkey"),
            precision: row.nonzero_int("numeric_precision"),
            scale: row.nonzero_int("numeric_scale"),
            size: row.nonzero_int("size"),
            unsigned: false,
        }
    }
}

#[async_trait::async_trait]
impl SchemaDriver for PostgresDriver {
    fn platform(&self) -> Platform {
        Platform::Postgres
    }

    fn capabilities(&self) -> &'static [Operation] {
        CAPABILITIES
    }

    async fn list_databases(&self) -> SchemaResult<Vec<String>> {
        let rows = self
            .run(
                Select::from("pg_database")
                    .column("datname")
                    .filter_eq_expr("datistemplate", "false"),
            )
            .await?;
        Ok(rows.iter().filter_map(|r| r.text("datname")).collect())
    }

    async fn list_tables(&self, schema: Option<&str>) -> SchemaResult<Vec<String>> {
        let rows = self
            .run(
                Select::from("information_schema.tables")
                    .column("table_name")
                    .filter_eq("table_type", "BASE TABLE")
                    .filter_eq("table_schema", schema.unwrap_or(DEFAULT_SCHEMA)),
            )
            .await?;
        Ok(rows.iter().filter_map(|r| r.text("table_name")).collect())
    }

    async fn list_views(&self, schema: Option<&str>) -> SchemaResult<Vec<String>> {
        let rows = self
            .run(
                Select::from("information_schema.views")
                    .column("table_name")
                    .filter_eq("table_schema", schema.unwrap_or(DEFAULT_SCHEMA)),
            )
            .await?;
        Ok(rows.iter().filter_map(|r| r.text("table_name")).collect())
    }

    async fn list_columns(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<Vec<ColumnDescriptor>> {
        let version = self.get_database_version().await?;
        tracing::debug!(
            "Listing PostgreSQL columns for {} (schema: {:?}, server {})",
            table,
            schema,
            version
        );

        let rows = self
            .executor
            .fetch_all(&Self::columns_sql(&version), &Self::table_params(table, schema))
            .await?;
        Ok(rows.iter().map(Self::to_column).collect())
    }

    async fn list_indexes(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> SchemaResult<Vec<IndexDescriptor>> {
        tracing::debug!("Listing PostgreSQL indexes for {} (schema: {:?})", table, schema);
        let rows = self
            .executor
            .fetch_all(INDEXES_SQL, &Self::table_params(table, schema))
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
        tracing::debug!("Listing PostgreSQL foreign keys for {} (schema: {:?})", table, schema);
        let rows = self
            .executor
            .fetch_all(FOREIGN_KEYS_SQL, &Self::table_params(table, schema))
            .await?;
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
            .fetch_all("SELECT version() AS version", &[])
            .await?;
        let banner = rows
            .first()
            .and_then(|r| r.text("version"))
            .unwrap_or_default();

        match extract_postgres_version(&banner) {
            Some(version) => Ok(version),
            None => {
                tracing::warn!("Unrecognized PostgreSQL version banner: {}", banner);
                Ok(banner)
            }
        }
    }

    async fn default_schema_name(&self) -> SchemaResult<String> {
        Ok(DEFAULT_SCHEMA.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::MockExecutor;
    use crate::models::{DbType, GeneralType};
    use serde_json::json;

    fn banner(version: &str) -> serde_json::Value {
        json!({"version": format!("PostgreSQL {} on x86_64-pc-linux-gnu", version)})
    }

    #[test]
    fn test_identity_predicate_depends_on_version() {
        assert!(PostgresDriver::columns_sql("12").contains("attidentity"));
        assert!(PostgresDriver::columns_sql("16.2").contains("attidentity"));
        assert!(!PostgresDriver::columns_sql("11.9").contains("attidentity"));
        assert!(!PostgresDriver::columns_sql("9.6.24").contains("attidentity"));
        assert!(!PostgresDriver::columns_sql("11.9").contains("{identity}"));
    }

    #[tokio::test]
    async fn test_list_columns_uses_server_version() {
        let executor = Arc::new(
            MockExecutor::new()
                .respond("SELECT version()", vec![banner("15.4")])
                .respond("FROM pg_class c", vec![json!({
                    "column_name": "id", "data_type": "int4", "type_type": "b",
                    "column_comment": null, "is_nullable": false,
                    "column_default": "nextval('users_id_seq'::regclass)",
                    "is_autoinc": true, "enum_values": null,
                    "numeric_precision": 32, "numeric_scale": 0, "size": null, "is_pkey": true
                })]),
        );
        let driver = PostgresDriver::new(executor.clone());

        let columns = driver.list_columns("users", None).await.unwrap();
        assert_eq!(columns.len(), 1);
        assert!(columns[0].auto_increment);
        assert!(columns[0].is_primary_key);
        assert!(!columns[0].allow_null);
        assert_eq!(columns[0].db_type, DbType::Integer);
        assert_eq!(columns[0].precision, Some(32));
        assert_eq!(columns[0].scale, None);
        assert!(columns[0].enum_values.is_empty());

        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].sql.contains("attidentity"));
        assert_eq!(calls[1].params, vec!["users", "public"]);
    }

    #[tokio::test]
    async fn test_legacy_server_skips_identity_signal() {
        let executor = Arc::new(MockExecutor::new().respond("SELECT version()", vec![banner("11.22")]));
        let driver = PostgresDriver::new(executor.clone());

        driver.list_columns("users", Some("crm")).await.unwrap();

        let calls = executor.calls();
        assert!(!calls[1].sql.contains("attidentity"));
        assert_eq!(calls[1].params, vec!["users", "crm"]);
    }

    #[tokio::test]
    async fn test_enum_labels_become_enum_values() {
        let executor = Arc::new(
            MockExecutor::new()
                .respond("SELECT version()", vec![banner("14.1")])
                .respond("FROM pg_class c", vec![json!({
                    "column_name": "mood", "data_type": "mood", "type_type": "e",
                    "is_nullable": true, "is_autoinc": false,
                    "enum_values": r#"["sad","ok","happy"]"#, "is_pkey": false
                })]),
        );
        let driver = PostgresDriver::new(executor);

        let columns = driver.list_columns("people", None).await.unwrap();
        assert_eq!(columns[0].enum_values, vec!["sad", "ok", "happy"]);
        assert_eq!(columns[0].general_type, GeneralType::String);
        assert!(columns[0].allow_null);
    }

    #[tokio::test]
    async fn test_enum_label_with_comma_stays_whole() {
        let executor = Arc::new(
            MockExecutor::new()
                .respond("SELECT version()", vec![banner("15.2")])
                .respond("FROM pg_class c", vec![json!({
                    "column_name": "size", "data_type": "shirt_size", "type_type": "e",
                    "is_nullable": false, "is_autoinc": false,
                    "enum_values": r#"["small","large, tall","x \"big\""]"#, "is_pkey": false
                })]),
        );
        let driver = PostgresDriver::new(executor.clone());

        let columns = driver.list_columns("shirts", None).await.unwrap();
        assert_eq!(columns[0].enum_values, vec!["small", "large, tall", "x \"big\""]);
        assert!(executor.calls()[1].sql.contains("array_to_json("));
    }

    #[tokio::test]
    async fn test_table_schema_scopes_sequence_to_call() {
        let executor = Arc::new(
            MockExecutor::new()
                .respond("SELECT version()", vec![banner("16.0")])
                .respond("FROM pg_class c\n", vec![
                    json!({"column_name": "id", "data_type": "int8", "is_autoinc": true, "is_pkey": true, "is_nullable": false}),
                    json!({"column_name": "email", "data_type": "varchar", "is_autoinc": false, "is_pkey": false, "is_nullable": false, "size": 255}),
                ])
                .respond("FROM pg_class t", vec![
                    json!({"index_name": "users_pkey", "column_name": "id", "index_is_unique": true, "index_is_primary": true}),
                    json!({"index_name": "users_email_key", "column_name": "email", "index_is_unique": true, "index_is_primary": false}),
                ]),
        );
        let driver = PostgresDriver::new(executor);

        let schema = driver.get_table_schema("users", None).await.unwrap();
        assert_eq!(schema.schema_name, "public");
        assert_eq!(schema.primary_keys, vec!["id"]);
        assert_eq!(schema.sequence_name.as_deref(), Some("id"));
        assert_eq!(schema.indexes.len(), 1);
        assert_eq!(schema.indexes[0].name, "users_email_key");
        assert_eq!(schema.column("email").unwrap().size, Some(255));

        // a table without identity columns reports no sequence
        let executor = Arc::new(
            MockExecutor::new()
                .respond("SELECT version()", vec![banner("16.0")])
                .respond("FROM pg_class c\n", vec![
                    json!({"column_name": "code", "data_type": "text", "is_autoinc": false, "is_pkey": true}),
                ]),
        );
        let driver = PostgresDriver::new(executor);
        let schema = driver.get_table_schema("countries", Some("geo")).await.unwrap();
        assert!(schema.sequence_name.is_none());
        assert_eq!(schema.primary_keys, vec!["code"]);
        assert_eq!(schema.schema_name, "geo");
    }

    #[tokio::test]
    async fn test_version_extracted_from_banner() {
        let executor = Arc::new(MockExecutor::new().respond("SELECT version()", vec![banner("13.7")]));
        let driver = PostgresDriver::new(executor);
        assert_eq!(driver.get_database_version().await.unwrap(), "13.7");
    }

    #[tokio::test]
    async fn test_list_databases_excludes_templates() {
        let executor = Arc::new(MockExecutor::new().respond(
            "FROM pg_database",
            vec![json!({"datname": "postgres"}), json!({"datname": "app"})],
        ));
        let driver = PostgresDriver::new(executor.clone());

        assert_eq!(driver.list_databases().await.unwrap(), vec!["postgres", "app"]);
        assert!(executor.calls()[0].sql.contains("datistemplate = false"));
    }
}
