// Assembles a TableSchema from the independent column, index and
// foreign-key listings of one table.
use crate::error::SchemaResult;
use crate::models::{ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, TableSchema};
use crate::services::database::SchemaDriver;

/// Combine the three listings.
///
/// - `sequence_name`: first auto-increment column in listing order.
/// - `primary_keys`: index rows marked primary; column-level flags only when
///   the index data yields none.
/// - `indexes`: everything except primary-key index rows.
pub fn assemble_table_schema(
    schema_name: String,
    table_name: &str,
    columns: Vec<ColumnDescriptor>,
    indexes: Vec<IndexDescriptor>,
    foreign_keys: Vec<ForeignKeyDescriptor>,
) -> TableSchema {
    let sequence_name = columns
        .iter()
        .find(|c| c.auto_increment)
        .map(|c| c.name.clone());

    let mut primary_keys: Vec<String> = indexes
        .iter()
        .filter(|idx| idx.is_primary)
        .map(|idx| idx.column_name.clone())
        .collect();

    if primary_keys.is_empty() {
        primary_keys = columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone())
            .collect();
    }

    let indexes = indexes.into_iter().filter(|idx| !idx.is_primary).collect();

    TableSchema {
        schema_name,
        table_name: table_name.to_string(),
        primary_keys,
        sequence_name,
        foreign_keys,
        indexes,
        columns,
    }
}

/// Issue columns, indexes and constraints sequentially against one driver
/// and combine them. Any failing sub-query aborts the whole call.
pub async fn build_table_schema<D>(
    driver: &D,
    table: &str,
    schema: Option<&str>,
) -> SchemaResult<TableSchema>
where
    D: SchemaDriver + ?Sized,
{
    tracing::debug!(
        "Building table schema for {} on {} (schema: {:?})",
        table,
        driver.platform(),
        schema
    );

    let columns = driver.list_columns(table, schema).await?;
    let indexes = driver.list_indexes(table, schema).await?;
    let foreign_keys = driver.list_constraints(table, schema).await?;

    let schema_name = match schema {
        Some(s) => s.to_string(),
        None => driver.default_schema_name().await?,
    };

    Ok(assemble_table_schema(
        schema_name,
        table,
        columns,
        indexes,
        foreign_keys,
    ))
}
