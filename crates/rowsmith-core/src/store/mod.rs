//! # Row Store
//!
//! The mutation/query half of a database backend: row counts, sampling of
//! committed values, batch inserts and per-column profiling. Together with
//! [`MetadataProvider`](crate::schema::provider::MetadataProvider) this is the
//! full capability set the generator needs from its environment.

use serde::Serialize;

use crate::error::Result;
use crate::generate::rows::SyntheticRow;
use crate::generate::value::Value;

/// Outcome of one batch insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub affected_rows: u64,
    /// Id generated for the first inserted row, or 0 when the table has none.
    pub insert_id: u64,
}

/// Frequency and cardinality facts about one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    /// Most frequent non-null values, most frequent first.
    pub sample_values: Vec<Value>,
    pub null_count: u64,
    pub unique_count: u64,
}

/// Row-level access to a database.
pub trait RowStore: Send + Sync {
    /// Current committed row count of `table`.
    fn count_rows(&self, table: &str) -> impl std::future::Future<Output = Result<u64>> + Send;

    /// Up to `limit` non-null values of `table.column`, picked at random
    /// from committed rows.
    fn sample_column(
        &self,
        table: &str,
        column: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Value>>> + Send;

    /// Insert all `rows` as one atomic batch.
    ///
    /// Every row must carry the same columns in the same order. A rejection
    /// by the database (unique, not-null, foreign-key or check violation)
    /// surfaces as `ConstraintViolation` and nothing from the batch is kept.
    fn insert(
        &self,
        table: &str,
        rows: &[SyntheticRow],
    ) -> impl std::future::Future<Output = Result<InsertOutcome>> + Send;

    /// Top `top_n` values, null count and distinct count of `table.column`.
    fn profile_column(
        &self,
        table: &str,
        column: &str,
        top_n: usize,
    ) -> impl std::future::Future<Output = Result<ColumnProfile>> + Send;
}

/// Column names of a batch, taken from its first row.
pub fn batch_columns(rows: &[SyntheticRow]) -> Vec<&String> {
    rows.first().map(|r| r.keys().collect()).unwrap_or_default()
}

/// Quote a MySQL identifier, doubling embedded backticks.
pub fn quote_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a SQLite identifier, doubling embedded quotes.
pub fn quote_sqlite(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Classify a sqlx error from an INSERT: constraint rejections become
/// `ConstraintViolation`, everything else a query failure.
pub fn map_insert_error(table: &str, err: sqlx::Error) -> crate::error::RowsmithError {
    use crate::error::RowsmithError;
    use sqlx::error::ErrorKind;

    if let sqlx::Error::Database(db_err) = &err {
        let message = match db_err.kind() {
            ErrorKind::UniqueViolation => Some("uniqueness violation"),
            ErrorKind::ForeignKeyViolation => Some("foreign key violation"),
            ErrorKind::NotNullViolation => Some("not-null violation"),
            ErrorKind::CheckViolation => Some("check constraint violation"),
            _ => None,
        };
        if let Some(message) = message {
            return RowsmithError::ConstraintViolation {
                table: table.to_string(),
                message: message.to_string(),
                source: Box::new(err),
            };
        }
    }
    RowsmithError::Query {
        query: format!("insert into {}", table),
        source: err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_quote_identifiers() {
        assert_eq!(quote_mysql("users"), "`users`");
        assert_eq!(quote_mysql("we`ird"), "`we``ird`");
        assert_eq!(quote_sqlite("users"), "\"users\"");
        assert_eq!(quote_sqlite("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_batch_columns_follow_first_row() {
        let mut row = IndexMap::new();
        row.insert("b".to_string(), Value::Int(1));
        row.insert("a".to_string(), Value::Int(2));
        let rows = vec![row];
        let cols = batch_columns(&rows);
        assert_eq!(cols, vec!["b", "a"]);
        assert!(batch_columns(&[]).is_empty());
    }

    #[test]
    fn test_non_database_error_is_query_error() {
        let err = map_insert_error("users", sqlx::Error::RowNotFound);
        assert!(matches!(
            err,
            crate::error::RowsmithError::Query { .. }
        ));
    }
}
