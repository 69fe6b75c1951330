//! # Table Summary
//!
//! Row count plus per-column frequency facts for one table.

use serde::Serialize;

use crate::error::Result;
use crate::generate::value::Value;
use crate::schema::provider::MetadataProvider;
use crate::store::RowStore;

/// Most frequent values reported per column.
pub const TOP_VALUES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub table: String,
    pub row_count: u64,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    /// Up to five most frequent non-null values, most frequent first.
    pub sample_values: Vec<Value>,
    pub null_count: u64,
    pub unique_count: u64,
}

/// Summarize `table`. Fails with `NotFound` if the catalog does not list it.
pub async fn summarize_table<C>(catalog: &C, table: &str) -> Result<TableSummary>
where
    C: MetadataProvider + RowStore,
{
    let columns = catalog.describe_table(table).await?;
    let row_count = catalog.count_rows(table).await?;

    let mut summaries = Vec::with_capacity(columns.len());
    for column in columns {
        let profile = catalog.profile_column(table, &column.name, TOP_VALUES).await?;
        summaries.push(ColumnSummary {
            data_type: column.data_type.to_string(),
            name: column.name,
            sample_values: profile.sample_values,
            null_count: profile.null_count,
            unique_count: profile.unique_count,
        });
    }

    Ok(TableSummary {
        table: table.to_string(),
        row_count,
        columns: summaries,
    })
}
