//! In-memory backend used by tests and ephemeral sessions.

use super::{KeyValueStore, StorageError, StorageResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// `BTreeMap`-backed store with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store rejecting writes once keys plus values exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RefCell::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Total bytes currently held, counting keys and values.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(limit) = self.quota_bytes {
            let replaced = self
                .entries
                .borrow()
                .get(key)
                .map_or(0, |old| key.len() + old.len());
            let projected = self.used_bytes() - replaced + key.len() + value.len();
            if projected > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    limit_bytes: limit,
                });
            }
        }

        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::storage::{KeyValueStore, StorageError};

    #[test]
    fn quota_rejects_oversized_write_and_keeps_previous_value() {
        let store = MemoryStore::with_quota(16);
        store.set("k", "small").unwrap();

        let err = store.set("k", "this value is far too long").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit_bytes: 16, .. }));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn replacing_a_value_does_not_double_count_it() {
        let store = MemoryStore::with_quota(10);
        store.set("ab", "12345678").unwrap();
        store.set("ab", "87654321").unwrap();
        assert_eq!(store.used_bytes(), 10);
    }
}
