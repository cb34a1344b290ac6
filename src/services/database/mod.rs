// Database abstraction layer for multi-platform schema introspection
pub mod adapter;
pub mod mysql;
pub mod postgresql;
pub mod sqlite;
pub mod sqlsrv;
pub mod type_map;

pub use adapter::{Operation, SchemaDriver};
pub use mysql::MySqlDriver;
pub use postgresql::PostgresDriver;
pub use sqlite::SqliteDriver;
pub use sqlsrv::SqlSrvDriver;

use crate::error::{SchemaError, SchemaResult};
use crate::executor::CatalogExecutor;
use std::fmt;
use std::sync::Arc;

/// Driver-library names and their canonical platform
const PLATFORM_ALIASES: &[(&str, &str)] = &[
    ("mysql2", "mysql"),
    ("mariadb", "mysql"),
    ("pg", "postgres"),
    ("pgsql", "postgres"),
    ("pg-native", "postgres"),
    ("mssql", "sqlsrv"),
    ("sqlserver", "sqlsrv"),
    ("tedious", "sqlsrv"),
    ("sqlsrv", "sqlsrv"),
    ("sqlite3", "sqlite"),
    ("better-sqlite3", "sqlite"),
];

/// Supported database platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    MySql,
    Postgres,
    Sqlite,
    SqlSrv,
}

impl Platform {
    /// Map a driver alias to its canonical name; unknown names pass through.
    pub fn canonical_name(name: &str) -> &str {
        PLATFORM_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, canonical)| *canonical)
            .unwrap_or(name)
    }

    /// Resolve a platform name or driver alias
    pub fn resolve(name: Option<&str>) -> SchemaResult<Self> {
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n,
            _ => return Err(SchemaError::UnsupportedPlatform(String::new())),
        };

        match Self::canonical_name(name) {
            "mysql" => Ok(Platform::MySql),
            "postgres" => Ok(Platform::Postgres),
            "sqlite" => Ok(Platform::Sqlite),
            "sqlsrv" => Ok(Platform::SqlSrv),
            other => Err(SchemaError::UnsupportedPlatform(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::MySql => "mysql",
            Platform::Postgres => "postgres",
            Platform::Sqlite => "sqlite",
            Platform::SqlSrv => "sqlsrv",
        }
    }

    /// Positional placeholder for the 1-based parameter `n`
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Platform::MySql => "?".to_string(),
            Platform::Postgres => format!("${}", n),
            Platform::Sqlite => format!("?{}", n),
            Platform::SqlSrv => format!("@P{}", n),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Factory function to create the catalog driver for a platform
pub fn create_driver(
    platform: Platform,
    executor: Arc<dyn CatalogExecutor>,
) -> Box<dyn SchemaDriver> {
    match platform {
        Platform::MySql => Box::new(MySqlDriver::new(executor)),
        Platform::Postgres => Box::new(PostgresDriver::new(executor)),
        Platform::Sqlite => Box::new(SqliteDriver::new(executor)),
        Platform::SqlSrv => Box::new(SqlSrvDriver::new(executor)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_canonical_names() {
        assert_eq!(Platform::resolve(Some("mysql")).unwrap(), Platform::MySql);
        assert_eq!(Platform::resolve(Some("postgres")).unwrap(), Platform::Postgres);
        assert_eq!(Platform::resolve(Some("sqlite")).unwrap(), Platform::Sqlite);
        assert_eq!(Platform::resolve(Some("sqlsrv")).unwrap(), Platform::SqlSrv);
    }

    #[test]
    fn test_resolve_driver_aliases() {
        for alias in ["mysql2", "mariadb"] {
            assert_eq!(Platform::resolve(Some(alias)).unwrap(), Platform::MySql);
        }
        for alias in ["pg", "pgsql", "pg-native"] {
            assert_eq!(Platform::resolve(Some(alias)).unwrap(), Platform::Postgres);
        }
        for alias in ["mssql", "sqlserver", "tedious"] {
            assert_eq!(Platform::resolve(Some(alias)).unwrap(), Platform::SqlSrv);
        }
        for alias in ["sqlite3", "better-sqlite3"] {
            assert_eq!(Platform::resolve(Some(alias)).unwrap(), Platform::Sqlite);
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        for (alias, _) in PLATFORM_ALIASES {
            let direct = Platform::resolve(Some(alias)).unwrap();
            let via_canonical = Platform::resolve(Some(Platform::canonical_name(alias))).unwrap();
            assert_eq!(direct, via_canonical);
            assert_eq!(Platform::resolve(Some(direct.as_str())).unwrap(), direct);
        }
    }

    #[test]
    fn test_unknown_platform_passes_through_and_fails() {
        assert_eq!(Platform::canonical_name("oracle"), "oracle");
        match Platform::resolve(Some("oracle")) {
            Err(SchemaError::UnsupportedPlatform(name)) => assert_eq!(name, "oracle"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_platform_is_unsupported() {
        assert!(matches!(
            Platform::resolve(None),
            Err(SchemaError::UnsupportedPlatform(_))
        ));
        assert!(matches!(
            Platform::resolve(Some("  ")),
            Err(SchemaError::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Platform::MySql.placeholder(3), "?");
        assert_eq!(Platform::Postgres.placeholder(3), "$3");
        assert_eq!(Platform::Sqlite.placeholder(3), "?3");
        assert_eq!(Platform::SqlSrv.placeholder(3), "@P3");
    }
}
