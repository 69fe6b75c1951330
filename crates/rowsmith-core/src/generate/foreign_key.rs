//! # Foreign Key Value Pool
//!
//! Holds committed values of referenced columns so FK columns can pick valid
//! references. A pool is filled from the store the first time a column is
//! referenced and dropped whenever rows are inserted into its table, so the
//! next pick sees the new committed state.

use std::collections::HashMap;

use crate::error::Result;
use crate::generate::providers::ValueSynthesizer;
use crate::generate::value::Value;
use crate::store::RowStore;

/// Pools of committed values keyed by (table, column).
pub struct ForeignKeyPool {
    pools: HashMap<(String, String), Vec<Value>>,
    /// Values sampled per referenced column.
    pool_size: usize,
}

impl ForeignKeyPool {
    pub fn new(pool_size: usize) -> Self {
        Self {
            pools: HashMap::new(),
            pool_size: pool_size.max(1),
        }
    }

    /// Committed values of `table.column`, sampled from the store on first use.
    pub async fn load<S: RowStore>(&mut self, store: &S, table: &str, column: &str) -> Result<&[Value]> {
        let key = (table.to_string(), column.to_string());
        if !self.pools.contains_key(&key) {
            let values = store.sample_column(table, column, self.pool_size).await?;
            tracing::debug!("Sampled {} values from {}.{}", values.len(), table, column);
            self.pools.insert(key.clone(), values);
        }
        Ok(self.pools.get(&key).map(|v| v.as_slice()).unwrap_or_default())
    }

    /// Pick a random committed value for a FK reference.
    ///
    /// Returns `None` when the referenced column has no committed values.
    pub async fn pick_reference<S: RowStore>(
        &mut self,
        store: &S,
        table: &str,
        column: &str,
        synth: &mut ValueSynthesizer,
    ) -> Result<Option<Value>> {
        let pool = self.load(store, table, column).await?;
        Ok(synth.pick(pool).cloned())
    }

    /// Forget sampled values of `table` after its contents changed.
    pub fn invalidate(&mut self, table: &str) {
        self.pools.retain(|(t, _), _| t != table);
    }

    /// Number of sampled values currently held for a column.
    pub fn pool_len(&self, table: &str, column: &str) -> usize {
        self.pools
            .get(&(table.to_string(), column.to_string()))
            .map(|p| p.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::rows::SyntheticRow;
    use crate::store::{ColumnProfile, InsertOutcome};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store whose every column holds the same committed values.
    struct FixedStore {
        values: Vec<Value>,
        samples: AtomicUsize,
    }

    impl RowStore for FixedStore {
        async fn count_rows(&self, _table: &str) -> Result<u64> {
            Ok(self.values.len() as u64)
        }

        async fn sample_column(&self, _table: &str, _column: &str, limit: usize) -> Result<Vec<Value>> {
            self.samples.fetch_add(1, Ordering::SeqCst);
            Ok(self.values.iter().take(limit).cloned().collect())
        }

        async fn insert(&self, _table: &str, rows: &[SyntheticRow]) -> Result<InsertOutcome> {
            Ok(InsertOutcome {
                affected_rows: rows.len() as u64,
                insert_id: 0,
            })
        }

        async fn profile_column(&self, _table: &str, _column: &str, _top_n: usize) -> Result<ColumnProfile> {
            Ok(ColumnProfile::default())
        }
    }

    fn synth() -> ValueSynthesizer {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        ValueSynthesizer::new(Some(42), 0.0, base)
    }

    #[tokio::test]
    async fn test_pick_from_committed_values() {
        let store = FixedStore {
            values: vec![Value::Int(1), Value::Int(2), Value::Int(3)],
            samples: AtomicUsize::new(0),
        };
        let mut pool = ForeignKeyPool::new(1000);
        let mut synth = synth();

        for _ in 0..20 {
            let picked = pool.pick_reference(&store, "users", "id", &mut synth).await.unwrap();
            let v = picked.and_then(|v| v.as_int()).unwrap();
            assert!((1..=3).contains(&v));
        }
        // Sampled once, then served from the pool
        assert_eq!(store.samples.load(Ordering::SeqCst), 1);
        assert_eq!(pool.pool_len("users", "id"), 3);
    }

    #[tokio::test]
    async fn test_empty_pool() {
        let store = FixedStore {
            values: Vec::new(),
            samples: AtomicUsize::new(0),
        };
        let mut pool = ForeignKeyPool::new(1000);
        let picked = pool.pick_reference(&store, "users", "id", &mut synth()).await.unwrap();
        assert!(picked.is_none());
    }

    #[tokio::test]
    async fn test_pool_size_limits_sample() {
        let store = FixedStore {
            values: (1..=50).map(Value::Int).collect(),
            samples: AtomicUsize::new(0),
        };
        let mut pool = ForeignKeyPool::new(10);
        let loaded = pool.load(&store, "users", "id").await.unwrap();
        assert_eq!(loaded.len(), 10);
    }

    #[tokio::test]
    async fn test_invalidate_forces_resample() {
        let store = FixedStore {
            values: vec![Value::Int(1)],
            samples: AtomicUsize::new(0),
        };
        let mut pool = ForeignKeyPool::new(1000);
        pool.load(&store, "users", "id").await.unwrap();
        pool.load(&store, "posts", "id").await.unwrap();
        pool.invalidate("users");
        assert_eq!(pool.pool_len("users", "id"), 0);
        assert_eq!(pool.pool_len("posts", "id"), 1);

        pool.load(&store, "users", "id").await.unwrap();
        assert_eq!(store.samples.load(Ordering::SeqCst), 3);
    }
}
