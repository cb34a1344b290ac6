use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{CatalogExecutor, CatalogRow};
use crate::error::{SchemaError, SchemaResult};

/// SQLite catalog executor
/// Uses tokio::Mutex for async-friendly locking
#[derive(Clone)]
pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteExecutor {
    /// Open a database file. Accepts plain paths as well as
    /// `sqlite:./path`, `sqlite://path` and `sqlite::memory:`.
    pub fn open<P: AsRef<Path>>(db_path: P) -> SchemaResult<Self> {
        let path_str = db_path.as_ref().to_string_lossy();
        let clean_path: &str = if path_str.starts_with("sqlite:") {
            let mut cleaned = path_str.trim_start_matches("sqlite:");
            cleaned = cleaned.trim_start_matches("//");
            cleaned
        } else {
            path_str.as_ref()
        };

        let conn = if clean_path.is_empty() || clean_path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(clean_path)
        }
        .map_err(|e| SchemaError::Connection(format!("Failed to open SQLite database: {}", e)))?;

        tracing::debug!("Opened SQLite database: {}", clean_path);
        Ok(Self::from_connection(conn))
    }

    pub fn in_memory() -> SchemaResult<Self> {
        Self::open(":memory:")
    }

    /// Wrap an existing connection owned by the host application
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run a batch of statements (DDL, fixtures) on the wrapped connection
    pub async fn execute_batch(&self, sql: &str) -> SchemaResult<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch(sql)?;
        Ok(())
    }

    fn value_to_json(value: ValueRef<'_>) -> Value {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => json!(i),
            ValueRef::Real(f) => json!(f),
            ValueRef::Text(bytes) => json!(String::from_utf8_lossy(bytes)),
            ValueRef::Blob(_) => Value::Null,
        }
    }
}

#[async_trait::async_trait]
impl CatalogExecutor for SqliteExecutor {
    async fn fetch_all(&self, sql: &str, params: &[String]) -> SchemaResult<Vec<CatalogRow>> {
        tracing::debug!("sqlite catalog query: {}", sql.trim());
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Map::new();
            for (idx, name) in columns.iter().enumerate() {
                values.insert(name.clone(), Self::value_to_json(row.get_ref(idx)?));
            }
            out.push(CatalogRow::new(values));
        }

        Ok(out)
    }
}
