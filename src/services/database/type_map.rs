// Raw engine type names -> canonical DbType, per platform.
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::Platform;
use crate::models::{DbType, GeneralType};

static MYSQL_TYPES: Lazy<HashMap<&'static str, DbType>> = Lazy::new(|| {
    HashMap::from([
        ("tinyint", DbType::Tinyint),
        ("bool", DbType::Tinyint),
        ("boolean", DbType::Tinyint),
        ("bit", DbType::Integer),
        ("smallint", DbType::Smallint),
        ("mediumint", DbType::Integer),
        ("int", DbType::Integer),
        ("integer", DbType::Integer),
        ("bigint", DbType::Bigint),
        ("float", DbType::Float),
        ("double", DbType::Double),
        ("double precision", DbType::Double),
        ("real", DbType::Float),
        ("decimal", DbType::Decimal),
        ("numeric", DbType::Decimal),
        ("dec", DbType::Decimal),
        ("fixed", DbType::Decimal),
        ("tinytext", DbType::Text),
        ("mediumtext", DbType::Text),
        ("longtext", DbType::Text),
        ("longblob", DbType::Binary),
        ("blob", DbType::Binary),
        ("text", DbType::Text),
        ("varchar", DbType::String),
        ("string", DbType::String),
        ("char", DbType::Char),
        ("datetime", DbType::Datetime),
        ("year", DbType::Date),
        ("date", DbType::Date),
        ("time", DbType::Time),
        ("timestamp", DbType::Timestamp),
        ("enum", DbType::String),
        ("set", DbType::String),
        ("binary", DbType::Binary),
        ("varbinary", DbType::Binary),
        ("json", DbType::Json),
    ])
});

static POSTGRES_TYPES: Lazy<HashMap<&'static str, DbType>> = Lazy::new(|| {
    HashMap::from([
        ("bit", DbType::Integer),
        ("bit varying", DbType::Integer),
        ("varbit", DbType::Integer),
        ("bool", DbType::Boolean),
        ("boolean", DbType::Boolean),
        ("box", DbType::String),
        ("circle", DbType::String),
        ("point", DbType::String),
        ("line", DbType::String),
        ("lseg", DbType::String),
        ("polygon", DbType::String),
        ("path", DbType::String),
        ("character", DbType::Char),
        ("char", DbType::Char),
        ("bpchar", DbType::Char),
        ("character varying", DbType::String),
        ("varchar", DbType::String),
        ("text", DbType::Text),
        ("bytea", DbType::Binary),
        ("cidr", DbType::String),
        ("inet", DbType::String),
        ("macaddr", DbType::String),
        ("real", DbType::Float),
        ("float4", DbType::Float),
        ("double precision", DbType::Double),
        ("float8", DbType::Double),
        ("decimal", DbType::Decimal),
        ("numeric", DbType::Decimal),
        ("money", DbType::Money),
        ("smallint", DbType::Smallint),
        ("int2", DbType::Smallint),
        ("int4", DbType::Integer),
        ("int", DbType::Integer),
        ("integer", DbType::Integer),
        ("bigint", DbType::Bigint),
        ("int8", DbType::Bigint),
        ("oid", DbType::Bigint),
        ("smallserial", DbType::Smallint),
        ("serial2", DbType::Smallint),
        ("serial4", DbType::Integer),
        ("serial", DbType::Integer),
        ("bigserial", DbType::Bigint),
        ("serial8", DbType::Bigint),
        ("pg_lsn", DbType::Bigint),
        ("date", DbType::Date),
        ("interval", DbType::String),
        ("time without time zone", DbType::Time),
        ("time", DbType::Time),
        ("time with time zone", DbType::Time),
        ("timetz", DbType::Time),
        ("timestamp without time zone", DbType::Timestamp),
        ("timestamp", DbType::Timestamp),
        ("timestamp with time zone", DbType::Timestamp),
        ("timestamptz", DbType::Timestamp),
        ("abstime", DbType::Timestamp),
        ("tsquery", DbType::String),
        ("tsvector", DbType::String),
        ("txid_snapshot", DbType::String),
        ("unknown", DbType::String),
        ("uuid", DbType::String),
        ("json", DbType::Json),
        ("jsonb", DbType::Json),
        ("xml", DbType::String),
    ])
});

/// SQLite declared types, keyed on the name before any `(n)` suffix.
/// Affinity names outside the canonical set (`real`, `blob`, `numeric`)
/// are folded into their closest canonical type.
static SQLITE_TYPES: Lazy<HashMap<&'static str, DbType>> = Lazy::new(|| {
    HashMap::from([
        ("text", DbType::Text),
        ("varchar", DbType::Text),
        ("char", DbType::Text),
        ("int", DbType::Integer),
        ("integer", DbType::Integer),
        ("real", DbType::Double),
        ("blob", DbType::Binary),
        ("numeric", DbType::Decimal),
    ])
});

static SQLSRV_TYPES: Lazy<HashMap<&'static str, DbType>> = Lazy::new(|| {
    HashMap::from([
        // exact numbers
        ("bigint", DbType::Bigint),
        ("numeric", DbType::Decimal),
        ("bit", DbType::Smallint),
        ("smallint", DbType::Smallint),
        ("decimal", DbType::Decimal),
        ("smallmoney", DbType::Money),
        ("int", DbType::Integer),
        ("tinyint", DbType::Tinyint),
        ("money", DbType::Money),
        // approximate numbers
        ("float", DbType::Float),
        ("double", DbType::Double),
        ("real", DbType::Float),
        // date and time
        ("date", DbType::Date),
        ("datetimeoffset", DbType::Datetime),
        ("datetime2", DbType::Datetime),
        ("smalldatetime", DbType::Datetime),
        ("datetime", DbType::Datetime),
        ("time", DbType::Time),
        // character strings
        ("char", DbType::Char),
        ("varchar", DbType::String),
        ("text", DbType::Text),
        ("nchar", DbType::Char),
        ("nvarchar", DbType::String),
        ("ntext", DbType::Text),
        // binary strings
        ("binary", DbType::Binary),
        ("varbinary", DbType::Binary),
        ("image", DbType::Binary),
        // other
        ("timestamp", DbType::Timestamp),
        ("hierarchyid", DbType::String),
        ("uniqueidentifier", DbType::String),
        ("sql_variant", DbType::String),
        ("xml", DbType::String),
        ("table", DbType::String),
    ])
});

static ENUM_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^\s*(?:enum|set)\s*\((.*)\)\s*$").expect("valid regex"));

static UNSIGNED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bunsigned\b").expect("valid regex"));

/// The static raw-type table of a platform
pub fn type_table(platform: Platform) -> &'static HashMap<&'static str, DbType> {
    match platform {
        Platform::MySql => &MYSQL_TYPES,
        Platform::Postgres => &POSTGRES_TYPES,
        Platform::Sqlite => &SQLITE_TYPES,
        Platform::SqlSrv => &SQLSRV_TYPES,
    }
}

/// Lower-case the name and drop any `(length)` suffix: `VARCHAR(50)` -> `varchar`.
fn normalize_raw_type(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    match lowered.find('(') {
        Some(pos) => lowered[..pos].trim_end().to_string(),
        None => lowered,
    }
}

/// Unify an engine-native type name into `(dbType, generalType)`.
/// Unknown names resolve to `STRING`; this never fails.
pub fn unify(platform: Platform, raw_type: &str) -> (DbType, GeneralType) {
    let db_type = type_table(platform)
        .get(normalize_raw_type(raw_type).as_str())
        .copied()
        .unwrap_or(DbType::String);
    (db_type, db_type.general_type())
}

/// Literal values of an `enum('a','b')` / `set('a','b')` declaration, in
/// declaration order. Anything else yields an empty list.
pub fn parse_enum_values(column_type: &str) -> Vec<String> {
    let Some(caps) = ENUM_DECLARATION.captures(column_type) else {
        return Vec::new();
    };

    let body = &caps[1];
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' if in_quotes => {
                // '' inside a literal is an escaped quote
                if chars.peek() == Some(&'\'') {
                    current.push('\'');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '\'' => in_quotes = true,
            '\\' if in_quotes => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ',' if !in_quotes => {
                values.push(current.trim().to_string());
                current.clear();
            }
            _ if in_quotes => current.push(c),
            _ => {
                if !c.is_whitespace() {
                    current.push(c);
                }
            }
        }
    }
    values.push(current.trim().to_string());
    values
}

/// Whether a raw type declaration carries the `unsigned` marker
pub fn is_unsigned(column_type: &str) -> bool {
    UNSIGNED_MARKER.is_match(column_type)
}
