use std::str::FromStr;

use sqlx::query_builder::Separated;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Row};
use tracing::debug;

use crate::error::{Result, RowsmithError};
use crate::generate::rows::SyntheticRow;
use crate::generate::value::Value;
use crate::schema::provider::MetadataProvider;
use crate::schema::sanitize_url;
use crate::schema::types::*;
use crate::store::{batch_columns, map_insert_error, quote_sqlite, ColumnProfile, InsertOutcome, RowStore};

/// Upper bound on bound parameters per statement (SQLITE_MAX_VARIABLE_NUMBER
/// on older builds).
const MAX_BIND_PARAMS: usize = 999;

/// SQLite catalog backed by `sqlite_master` and the table PRAGMAs.
///
/// SQLite foreign keys are unnamed, so each edge gets a synthetic
/// constraint name `fk_<table>_<id>` from its `foreign_key_list` id.
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `url`, creating the database file if needed.
    ///
    /// In-memory databases get a single connection: each connection would
    /// otherwise see its own empty database.
    pub async fn connect(url: &str) -> Result<Self> {
        let connection_error = |e: sqlx::Error| RowsmithError::Connection {
            message: "Failed to open SQLite database".to_string(),
            connection_hint: sanitize_url(url),
            source: e,
        };

        let options = SqliteConnectOptions::from_str(url)
            .map_err(connection_error)?
            .create_if_missing(true)
            .foreign_keys(true);
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(connection_error)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn raw_columns(&self, table: &str) -> Result<Vec<RawColumn>> {
        let query = format!("PRAGMA table_xinfo({})", quote_sqlite(table));
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RowsmithError::Query {
                query: format!("PRAGMA table_xinfo({})", table),
                source: e,
            })?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let hidden: i64 = row.get("hidden");
            // 1 = hidden column of a virtual table
            if hidden == 1 {
                continue;
            }
            columns.push(RawColumn {
                name: row.get("name"),
                type_str: row.get("type"),
                notnull: row.get::<i64, _>("notnull") != 0,
                default: row.get("dflt_value"),
                pk: row.get("pk"),
                generated: hidden == 2 || hidden == 3,
            });
        }
        Ok(columns)
    }

    /// Columns covered on their own by a UNIQUE index.
    async fn unique_columns(&self, table: &str) -> Result<Vec<String>> {
        let query = format!("PRAGMA index_list({})", quote_sqlite(table));
        let indexes = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RowsmithError::Query {
                query: format!("PRAGMA index_list({})", table),
                source: e,
            })?;

        let mut unique = Vec::new();
        for idx in &indexes {
            let is_unique: i64 = idx.get("unique");
            if is_unique != 1 {
                continue;
            }
            let idx_name: String = idx.get("name");
            let info_query = format!("PRAGMA index_info({})", quote_sqlite(&idx_name));
            let cols = sqlx::query(&info_query)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RowsmithError::Query {
                    query: format!("PRAGMA index_info({})", idx_name),
                    source: e,
                })?;
            if cols.len() == 1 {
                let name: Option<String> = cols[0].get("name");
                unique.extend(name);
            }
        }
        Ok(unique)
    }

    async fn outgoing_edges(&self, table: &str) -> Result<Vec<ForeignKeyEdge>> {
        let query = format!("PRAGMA foreign_key_list({})", quote_sqlite(table));
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RowsmithError::Query {
                query: format!("PRAGMA foreign_key_list({})", table),
                source: e,
            })?;

        let mut edges = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: i64 = row.get("id");
            let target_table: String = row.get("table");
            let from: String = row.get("from");
            // NULL when the constraint references the parent's primary key implicitly
            let to: Option<String> = row.get("to");

            let target_column = match to {
                Some(to) => to,
                None => self.implicit_target_column(&target_table).await?,
            };

            edges.push(ForeignKeyEdge {
                source_table: table.to_string(),
                source_column: from,
                target_table,
                target_column,
                constraint_name: format!("fk_{}_{}", table, id),
            });
        }
        Ok(edges)
    }

    async fn implicit_target_column(&self, target_table: &str) -> Result<String> {
        let pk = self
            .raw_columns(target_table)
            .await?
            .into_iter()
            .filter(|c| c.pk > 0)
            .min_by_key(|c| c.pk)
            .map(|c| c.name);
        Ok(pk.unwrap_or_else(|| "rowid".to_string()))
    }

    async fn column_type(&self, table: &str, column: &str) -> Result<DataType> {
        let raw = self.raw_columns(table).await?;
        match raw.into_iter().find(|c| c.name == column) {
            Some(c) => Ok(DataType::from_raw(&c.type_str)),
            // Implicit key of tables without a declared primary key
            None if column.eq_ignore_ascii_case("rowid") => Ok(DataType::BigInt),
            None => Err(RowsmithError::NotFound {
                table: format!("{}.{}", table, column),
            }),
        }
    }
}

struct RawColumn {
    name: String,
    type_str: String,
    notnull: bool,
    default: Option<String>,
    pk: i64,
    generated: bool,
}

impl MetadataProvider for SqliteCatalog {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let query = "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name";
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RowsmithError::Query {
                query: "fetch tables".to_string(),
                source: e,
            })?;

        Ok(rows.into_iter().map(|row| row.get("name")).collect())
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        if !self.table_exists(table).await? {
            return Err(RowsmithError::NotFound {
                table: table.to_string(),
            });
        }

        let raw = self.raw_columns(table).await?;
        let unique = self.unique_columns(table).await?;
        let fk_columns: Vec<String> = self
            .outgoing_edges(table)
            .await?
            .into_iter()
            .map(|e| e.source_column)
            .collect();
        let pk_count = raw.iter().filter(|c| c.pk > 0).count();

        let columns = raw
            .into_iter()
            .map(|c| {
                let data_type = DataType::from_raw(&c.type_str);
                let mut column = ColumnDescriptor::new(c.name, data_type);
                column.raw_type = c.type_str.clone();
                // Rowid aliases may be NULL on insert; SQLite assigns the id.
                let rowid_alias = c.pk > 0 && pk_count == 1 && c.type_str.eq_ignore_ascii_case("INTEGER");
                column.nullable = !c.notnull && c.pk == 0;
                column.default = c.default;
                column.auto_generated = rowid_alias || c.generated;

                let (first, second) = parse_type_args(&c.type_str);
                if column.data_type.is_string() {
                    column.max_length = first;
                } else if column.data_type == DataType::Decimal {
                    column.numeric_precision = first;
                    column.numeric_scale = second;
                } else if column.data_type.is_integer() {
                    column.display_width = first;
                }

                column.key = if c.pk > 0 {
                    KeyRole::Primary
                } else if unique.contains(&column.name) {
                    KeyRole::Unique
                } else if fk_columns.contains(&column.name) {
                    KeyRole::Foreign
                } else {
                    KeyRole::None
                };
                column
            })
            .collect();

        Ok(columns)
    }

    async fn get_relations(&self, table: &str) -> Result<TableRelations> {
        let outgoing = self.outgoing_edges(table).await?;

        // SQLite has no reverse index of foreign keys; scan every table.
        let mut incoming = Vec::new();
        for other in self.list_tables().await? {
            for edge in self.outgoing_edges(&other).await? {
                if edge.target_table == table {
                    incoming.push(edge);
                }
            }
        }

        Ok(TableRelations { outgoing, incoming })
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS cnt FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RowsmithError::Query {
            query: format!("check table {}", table),
            source: e,
        })?;
        let count: i64 = row.get("cnt");
        Ok(count > 0)
    }
}

impl RowStore for SqliteCatalog {
    async fn count_rows(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) AS cnt FROM {}", quote_sqlite(table));
        let row = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RowsmithError::Query { query: sql, source: e })?;
        let count: i64 = row.get("cnt");
        Ok(count.max(0) as u64)
    }

    async fn sample_column(&self, table: &str, column: &str, limit: usize) -> Result<Vec<Value>> {
        let data_type = self.column_type(table, column).await?;
        let col = quote_sqlite(column);
        let sql = format!(
            "SELECT CAST({col} AS TEXT) AS v FROM {} WHERE {col} IS NOT NULL ORDER BY RANDOM() LIMIT ?",
            quote_sqlite(table),
        );
        let rows = sqlx::query(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RowsmithError::Query { query: sql, source: e })?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.get::<Option<String>, _>("v"))
            .map(|raw| Value::from_catalog_text(raw, &data_type))
            .collect())
    }

    async fn insert(&self, table: &str, rows: &[SyntheticRow]) -> Result<InsertOutcome> {
        if rows.is_empty() {
            return Ok(InsertOutcome::default());
        }

        let columns = batch_columns(rows);
        let quoted_table = quote_sqlite(table);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_insert_error(table, e))?;

        let mut outcome = InsertOutcome::default();

        if columns.is_empty() {
            // Every column is generated or defaulted.
            let sql = format!("INSERT INTO {} DEFAULT VALUES", quoted_table);
            for _ in rows {
                let result = sqlx::query(&sql)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_insert_error(table, e))?;
                if outcome.insert_id == 0 {
                    outcome.insert_id = result.last_insert_rowid().max(0) as u64;
                }
                outcome.affected_rows += result.rows_affected();
            }
        } else {
            let col_list = columns
                .iter()
                .map(|c| quote_sqlite(c))
                .collect::<Vec<_>>()
                .join(", ");
            let chunk_size = (MAX_BIND_PARAMS / columns.len()).max(1);

            for chunk in rows.chunks(chunk_size) {
                let mut builder: QueryBuilder<Sqlite> =
                    QueryBuilder::new(format!("INSERT INTO {} ({}) ", quoted_table, col_list));
                builder.push_values(chunk, |mut b, row| {
                    for col in &columns {
                        bind_sqlite(&mut b, row.get(*col));
                    }
                });

                let result = builder
                    .build()
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_insert_error(table, e))?;

                if outcome.insert_id == 0 {
                    // last_insert_rowid is the id of the chunk's final row
                    let last = result.last_insert_rowid();
                    let first = last - result.rows_affected() as i64 + 1;
                    outcome.insert_id = first.max(0) as u64;
                }
                outcome.affected_rows += result.rows_affected();
            }
        }

        tx.commit().await.map_err(|e| map_insert_error(table, e))?;
        debug!("Inserted {} rows into {}", outcome.affected_rows, table);

        Ok(outcome)
    }

    async fn profile_column(&self, table: &str, column: &str, top_n: usize) -> Result<ColumnProfile> {
        let data_type = self.column_type(table, column).await?;
        let col = quote_sqlite(column);
        let quoted_table = quote_sqlite(table);

        let top_sql = format!(
            "SELECT CAST({col} AS TEXT) AS v, COUNT(*) AS freq FROM {quoted_table} \
             WHERE {col} IS NOT NULL GROUP BY {col} ORDER BY freq DESC LIMIT ?"
        );
        let top_rows = sqlx::query(&top_sql)
            .bind(top_n as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RowsmithError::Query { query: top_sql, source: e })?;

        let counts_sql = format!(
            "SELECT COUNT(*) - COUNT({col}) AS nulls, COUNT(DISTINCT {col}) AS uniques FROM {quoted_table}"
        );
        let counts = sqlx::query(&counts_sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RowsmithError::Query { query: counts_sql, source: e })?;

        let nulls: i64 = counts.get("nulls");
        let uniques: i64 = counts.get("uniques");

        Ok(ColumnProfile {
            sample_values: top_rows
                .into_iter()
                .filter_map(|row| row.get::<Option<String>, _>("v"))
                .map(|raw| Value::from_catalog_text(raw, &data_type))
                .collect(),
            null_count: nulls.max(0) as u64,
            unique_count: uniques.max(0) as u64,
        })
    }
}

/// Numeric arguments of a declared type: `VARCHAR(40)` -> (40, None),
/// `DECIMAL(10,2)` -> (10, 2).
fn parse_type_args(type_str: &str) -> (Option<u32>, Option<u32>) {
    let (Some(start), Some(end)) = (type_str.find('('), type_str.rfind(')')) else {
        return (None, None);
    };
    if start >= end {
        return (None, None);
    }
    let mut parts = type_str[start + 1..end]
        .split(',')
        .map(|p| p.trim().parse::<u32>().ok());
    (parts.next().flatten(), parts.next().flatten())
}

/// Temporal values are bound as text in the same formats the catalog reads back.
fn bind_sqlite(b: &mut Separated<'_, '_, Sqlite, &'static str>, value: Option<&Value>) {
    match value {
        None | Some(Value::Null) => {
            b.push_bind(Option::<String>::None);
        }
        Some(Value::Bool(v)) => {
            b.push_bind(*v);
        }
        Some(Value::Int(v)) => {
            b.push_bind(*v);
        }
        Some(Value::Float(v)) => {
            b.push_bind(*v);
        }
        Some(Value::Bytes(v)) => {
            b.push_bind(v.clone());
        }
        Some(other) => {
            b.push_bind(other.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_args() {
        assert_eq!(parse_type_args("VARCHAR(40)"), (Some(40), None));
        assert_eq!(parse_type_args("DECIMAL(10, 2)"), (Some(10), Some(2)));
        assert_eq!(parse_type_args("INTEGER"), (None, None));
        assert_eq!(parse_type_args(")("), (None, None));
    }
}
