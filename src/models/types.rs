use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical database type shared by every engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DbType {
    Tinyint,
    Smallint,
    Integer,
    Bigint,
    Float,
    Double,
    Decimal,
    String,
    Char,
    Text,
    Binary,
    Date,
    Time,
    Datetime,
    Timestamp,
    Json,
    Money,
    Boolean,
}

impl DbType {
    pub const ALL: [DbType; 18] = [
        DbType::Tinyint,
        DbType::Smallint,
        DbType::Integer,
        DbType::Bigint,
        DbType::Float,
        DbType::Double,
        DbType::Decimal,
        DbType::String,
        DbType::Char,
        DbType::Text,
        DbType::Binary,
        DbType::Date,
        DbType::Time,
        DbType::Datetime,
        DbType::Timestamp,
        DbType::Json,
        DbType::Money,
        DbType::Boolean,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DbType::Tinyint => "TINYINT",
            DbType::Smallint => "SMALLINT",
            DbType::Integer => "INTEGER",
            DbType::Bigint => "BIGINT",
            DbType::Float => "FLOAT",
            DbType::Double => "DOUBLE",
            DbType::Decimal => "DECIMAL",
            DbType::String => "STRING",
            DbType::Char => "CHAR",
            DbType::Text => "TEXT",
            DbType::Binary => "BINARY",
            DbType::Date => "DATE",
            DbType::Time => "TIME",
            DbType::Datetime => "DATETIME",
            DbType::Timestamp => "TIMESTAMP",
            DbType::Json => "JSON",
            DbType::Money => "MONEY",
            DbType::Boolean => "BOOLEAN",
        }
    }

    /// Coarse application type. Temporal and money types have no dedicated
    /// general type and surface as strings.
    pub fn general_type(&self) -> GeneralType {
        match self {
            DbType::Tinyint | DbType::Smallint | DbType::Integer | DbType::Bigint => {
                GeneralType::Integer
            }
            DbType::Boolean => GeneralType::Boolean,
            DbType::Float | DbType::Double | DbType::Decimal => GeneralType::Double,
            DbType::String | DbType::Text | DbType::Char => GeneralType::String,
            DbType::Binary => GeneralType::Resource,
            DbType::Json => GeneralType::Array,
            DbType::Date
            | DbType::Time
            | DbType::Datetime
            | DbType::Timestamp
            | DbType::Money => GeneralType::String,
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// General application type exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneralType {
    Integer,
    Boolean,
    Double,
    String,
    Resource,
    Array,
}

impl GeneralType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneralType::Integer => "integer",
            GeneralType::Boolean => "boolean",
            GeneralType::Double => "double",
            GeneralType::String => "string",
            GeneralType::Resource => "resource",
            GeneralType::Array => "array",
        }
    }
}

impl fmt::Display for GeneralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
