// MySQL/MariaDB catalog executor using connection pooling
use mysql_async::{prelude::*, Conn, OptsBuilder, Params, Pool, Row, Value as MySqlValue};
use serde_json::{json, Map, Value};
use url::Url;

use super::{mask_credentials, CatalogExecutor, CatalogRow};
use crate::error::{SchemaError, SchemaResult};

pub struct MySqlExecutor {
    pool: Pool,
}

impl MySqlExecutor {
    pub fn new(connection_url: &str) -> SchemaResult<Self> {
        let mut url = Url::parse(connection_url)
            .map_err(|e| SchemaError::Connection(format!("Invalid MySQL URL: {}", e)))?;

        if url.scheme() != "mysql" && url.scheme() != "mariadb" {
            return Err(SchemaError::Connection(
                "URL must use mysql:// or mariadb:// scheme".to_string(),
            ));
        }

        // mysql_async only understands the mysql:// scheme
        if url.scheme() == "mariadb" && url.set_scheme("mysql").is_err() {
            return Err(SchemaError::Connection(
                "Cannot rewrite mariadb:// URL to mysql://".to_string(),
            ));
        }

        let opts = mysql_async::Opts::from_url(url.as_str())
            .map_err(|e| SchemaError::Connection(format!("Invalid MySQL URL: {}", e)))?;
        let pool = Pool::new(OptsBuilder::from_opts(opts));

        tracing::info!("Created MySQL pool for: {}", mask_credentials(connection_url));
        Ok(Self { pool })
    }

    /// Wrap a pool owned by the host application
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    async fn get_conn(&self) -> SchemaResult<Conn> {
        self.pool.get_conn().await.map_err(SchemaError::query)
    }

    /// Catalog values arrive mostly as byte strings; keep them textual.
    fn mysql_value_to_json(mysql_val: MySqlValue) -> Value {
        match mysql_val {
            MySqlValue::NULL => Value::Null,
            MySqlValue::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(s) => json!(s),
                Err(_) => Value::Null,
            },
            MySqlValue::Int(i) => json!(i),
            MySqlValue::UInt(u) => json!(u),
            MySqlValue::Float(f) => json!(f),
            MySqlValue::Double(d) => json!(d),
            MySqlValue::Date(y, m, d, h, min, s, _) => {
                json!(format!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}", y, m, d, h, min, s))
            }
            MySqlValue::Time(is_neg, d, h, m, s, _) => {
                let sign = if is_neg { "-" } else { "" };
                let total_hours = d * 24 + h as u32;
                json!(format!("{}{}:{:02}:{:02}", sign, total_hours, m, s))
            }
        }
    }
}

#[async_trait::async_trait]
impl CatalogExecutor for MySqlExecutor {
    async fn fetch_all(&self, sql: &str, params: &[String]) -> SchemaResult<Vec<CatalogRow>> {
        tracing::debug!("mysql catalog query: {}", sql.trim());
        let mut conn = self.get_conn().await?;

        let params = if params.is_empty() {
            Params::Empty
        } else {
            Params::Positional(
                params
                    .iter()
                    .map(|p| MySqlValue::Bytes(p.clone().into_bytes()))
                    .collect(),
            )
        };

        let rows: Vec<Row> = conn.exec(sql, params).await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let mut values = Map::new();
            let columns = row.columns();
            for (idx, column) in columns.iter().enumerate() {
                let value = match row.as_ref(idx) {
                    Some(v) => Self::mysql_value_to_json(v.clone()),
                    None => Value::Null,
                };
                values.insert(column.name_str().to_string(), value);
            }
            out.push(CatalogRow::new(values));
        }

        Ok(out)
    }
}
