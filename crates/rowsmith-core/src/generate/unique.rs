use std::collections::{HashMap, HashSet};

use crate::generate::value::Value;

/// Values already used in the current batch for primary-key and unique
/// columns, so one batch never collides with itself.
pub struct UniqueTracker {
    seen: HashMap<String, HashSet<String>>,
    /// Attempts per value before the duplicate is kept and left to the database.
    pub max_retries: usize,
}

impl UniqueTracker {
    pub fn new() -> Self {
        Self {
            seen: HashMap::new(),
            max_retries: 100,
        }
    }

    /// Record `value` for `column`. Returns false if it was already used.
    ///
    /// NULL never collides.
    pub fn try_insert(&mut self, column: &str, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        self.seen
            .entry(column.to_string())
            .or_default()
            .insert(value.to_unique_key())
    }

    pub fn count(&self, column: &str) -> usize {
        self.seen.get(column).map(|s| s.len()).unwrap_or(0)
    }
}

impl Default for UniqueTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_tracking() {
        let mut tracker = UniqueTracker::new();
        let v1 = Value::owned("test@example.com".to_string());
        assert!(tracker.try_insert("email", &v1));
        assert!(!tracker.try_insert("email", &v1));

        let v2 = Value::owned("other@example.com".to_string());
        assert!(tracker.try_insert("email", &v2));
        // Columns are tracked separately
        assert!(tracker.try_insert("backup_email", &v1));
        assert_eq!(tracker.count("email"), 2);
    }

    #[test]
    fn test_nulls_never_collide() {
        let mut tracker = UniqueTracker::new();
        assert!(tracker.try_insert("email", &Value::Null));
        assert!(tracker.try_insert("email", &Value::Null));
        assert_eq!(tracker.count("email"), 0);
    }
}
