use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{DbType, GeneralType};

/// Normalized column metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    pub allow_null: bool,
    pub auto_increment: bool,
    pub comment: String,
    pub raw_type: String,
    pub db_type: DbType,
    #[serde(rename = "type")]
    pub general_type: GeneralType,
    pub default_value: Option<Value>,
    pub enum_values: Vec<String>,
    pub is_primary_key: bool,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
    pub size: Option<i64>,
    pub unsigned: bool,
}

/// One row per (index, column) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    pub name: String,
    pub column_name: String,
    pub is_unique: bool,
    pub is_primary: bool,
}

/// One row per (constraint, column) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyDescriptor {
    pub constraint_name: Option<String>,
    pub column_name: String,
    pub referenced_table_name: String,
    pub referenced_column_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub on_update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub on_delete: Option<String>,
}

/// Complete description of one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub schema_name: String,
    pub table_name: String,
    pub primary_keys: Vec<String>,
    /// Name of the auto-increment/identity column, not a sequence object
    pub sequence_name: Option<String>,
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
    /// Primary-key index rows are never included here
    pub indexes: Vec<IndexDescriptor>,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_serializes_with_camel_case_keys() {
        let column = ColumnDescriptor {
            name: "id".to_string(),
            allow_null: false,
            auto_increment: true,
            comment: String::new(),
            raw_type: "int(11)".to_string(),
            db_type: DbType::Integer,
            general_type: GeneralType::Integer,
            default_value: None,
            enum_values: vec![],
            is_primary_key: true,
            precision: Some(10),
            scale: None,
            size: None,
            unsigned: false,
        };

        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["allowNull"], false);
        assert_eq!(json["autoIncrement"], true);
        assert_eq!(json["dbType"], "INTEGER");
        assert_eq!(json["type"], "integer");
        assert_eq!(json["isPrimaryKey"], true);
        assert!(json["defaultValue"].is_null());
    }

    #[test]
    fn test_foreign_key_omits_absent_actions() {
        let fk = ForeignKeyDescriptor {
            constraint_name: Some("fk_posts_user".to_string()),
            column_name: "user_id".to_string(),
            referenced_table_name: "users".to_string(),
            referenced_column_name: "id".to_string(),
            on_update: None,
            on_delete: Some("CASCADE".to_string()),
        };

        let json = serde_json::to_value(&fk).unwrap();
        assert!(json.get("onUpdate").is_none());
        assert_eq!(json["onDelete"], "CASCADE");
        assert_eq!(json["referencedTableName"], "users");
    }
}
