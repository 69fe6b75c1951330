use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Result, RowsmithError};
use crate::generate::foreign_key::ForeignKeyPool;
use crate::generate::providers::ValueSynthesizer;
use crate::generate::unique::UniqueTracker;
use crate::generate::value::Value;
use crate::schema::types::{ColumnDescriptor, ForeignKeyEdge, KeyRole, TableMetadata};
use crate::store::{InsertOutcome, RowStore};

/// One row to insert: column name to value, in the table's column order.
///
/// Auto-generated columns are absent.
pub type SyntheticRow = IndexMap<String, Value>;

/// Builds batches of rows for one table and hands them to the store.
///
/// FK columns draw from committed values of the referenced column; every
/// other column goes through the [`ValueSynthesizer`].
pub struct RowAssembler {
    synthesizer: ValueSynthesizer,
    pool: ForeignKeyPool,
}

impl RowAssembler {
    pub fn new(synthesizer: ValueSynthesizer, fk_pool_size: usize) -> Self {
        Self {
            synthesizer,
            pool: ForeignKeyPool::new(fk_pool_size),
        }
    }

    /// Assemble `count` rows for `table` without touching the store's contents.
    pub async fn generate_rows<S: RowStore>(
        &mut self,
        store: &S,
        table: &TableMetadata,
        count: u64,
    ) -> Result<Vec<SyntheticRow>> {
        let mut unique = UniqueTracker::new();
        let mut rows = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let mut row = SyntheticRow::new();
            for column in &table.columns {
                if column.auto_generated {
                    continue;
                }
                let value = match table.outgoing_for(&column.name) {
                    Some(edge) => self.reference_value(store, column, edge).await?,
                    None => self.synthesize_value(column, &mut unique),
                };
                if let Some(value) = value {
                    row.insert(column.name.clone(), value);
                }
            }
            rows.push(row);
        }

        Ok(rows)
    }

    /// Assemble `count` rows and insert them as one batch.
    pub async fn populate<S: RowStore>(
        &mut self,
        store: &S,
        table: &TableMetadata,
        count: u64,
    ) -> Result<(InsertOutcome, Vec<SyntheticRow>)> {
        let rows = self.generate_rows(store, table, count).await?;
        let outcome = store.insert(&table.name, &rows).await?;
        self.pool.invalidate(&table.name);
        debug!(
            "Populated {} with {} rows (insert id {})",
            table.name, outcome.affected_rows, outcome.insert_id
        );
        Ok((outcome, rows))
    }

    fn synthesize_value(&mut self, column: &ColumnDescriptor, unique: &mut UniqueTracker) -> Option<Value> {
        let value = self.synthesizer.synthesize(column)?;
        if !is_unique_key(column) {
            return Some(value);
        }

        let mut value = value;
        for _ in 0..unique.max_retries {
            if unique.try_insert(&column.name, &value) {
                return Some(value);
            }
            value = self.synthesizer.synthesize(column)?;
        }
        // Out of retries: keep the duplicate and let the database reject it.
        Some(value)
    }

    /// A committed value of the referenced column.
    ///
    /// Nothing committed yet: NULL when the column allows it, otherwise the
    /// dependency cannot be satisfied.
    async fn reference_value<S: RowStore>(
        &mut self,
        store: &S,
        column: &ColumnDescriptor,
        edge: &ForeignKeyEdge,
    ) -> Result<Option<Value>> {
        let picked = self
            .pool
            .pick_reference(store, &edge.target_table, &edge.target_column, &mut self.synthesizer)
            .await?;

        match picked {
            Some(value) => Ok(Some(value)),
            None if column.nullable => Ok(Some(Value::Null)),
            None => Err(RowsmithError::UnsatisfiableDependency {
                table: edge.source_table.clone(),
                column: edge.source_column.clone(),
                target_table: edge.target_table.clone(),
                target_column: edge.target_column.clone(),
                reason: if edge.is_self_reference() {
                    "the column is NOT NULL and references its own empty table".to_string()
                } else {
                    "the referenced table has no committed rows".to_string()
                },
            }),
        }
    }
}

fn is_unique_key(column: &ColumnDescriptor) -> bool {
    matches!(column.key, KeyRole::Primary | KeyRole::Unique)
}
