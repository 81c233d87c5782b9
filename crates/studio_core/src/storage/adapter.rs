//! Typed JSON adapter over a `KeyValueStore`.
//!
//! # Responsibility
//! - Encode/decode values as JSON blobs under fixed keys.
//! - Absorb every storage fault: callers get a default value or a
//!   `SaveOutcome` flag, never an error.
//!
//! # Invariants
//! - No method of this adapter returns `Err` or panics on bad data.
//! - Every absorbed fault emits one `storage_*` log event.

use super::{KeyValueStore, StorageError};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Result envelope of a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl SaveOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(err: &StorageError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.success
    }
}

/// The single point of contact between services and the backend.
pub struct StorageAdapter<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> StorageAdapter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrows the wrapped backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads and decodes `key`, returning `default` on absence or any failure.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.load_raw(key) else {
            return default;
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=storage_load module=storage status=error key={} error_code=parse_failed error={}",
                    key,
                    StorageError::from(err)
                );
                default
            }
        }
    }

    /// Loads the unencoded string stored at `key`.
    pub fn load_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=storage_load module=storage status=error key={} error_code=backend_failed error={}",
                    key, err
                );
                None
            }
        }
    }

    /// Loads a JSON array as untyped entries for the healer.
    ///
    /// Absent keys, unparsable blobs, and non-array values all yield an
    /// empty list.
    pub fn load_collection(&self, key: &str) -> Vec<Value> {
        match self.load(key, Value::Null) {
            Value::Array(entries) => entries,
            Value::Null => Vec::new(),
            other => {
                warn!(
                    "event=storage_load module=storage status=error key={} error_code=not_an_array kind={}",
                    key,
                    json_kind(&other)
                );
                Vec::new()
            }
        }
    }

    /// Encodes and writes `value` under `key`.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> SaveOutcome {
        match serde_json::to_string(value) {
            Ok(encoded) => self.save_raw(key, &encoded),
            Err(err) => {
                let err = StorageError::from(err);
                warn!(
                    "event=storage_save module=storage status=error key={} error_code=encode_failed error={}",
                    key, err
                );
                SaveOutcome::failed(&err)
            }
        }
    }

    /// Writes an unencoded string under `key`.
    pub fn save_raw(&self, key: &str, value: &str) -> SaveOutcome {
        match self.store.set(key, value) {
            Ok(()) => {
                debug!(
                    "event=storage_save module=storage status=ok key={} bytes={}",
                    key,
                    value.len()
                );
                SaveOutcome::ok()
            }
            Err(err) => {
                warn!(
                    "event=storage_save module=storage status=error key={} error={}",
                    key, err
                );
                SaveOutcome::failed(&err)
            }
        }
    }

    /// Removes `key`; returns `false` when the backend failed.
    pub fn remove(&self, key: &str) -> bool {
        match self.store.remove(key) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "event=storage_remove module=storage status=error key={} error={}",
                    key, err
                );
                false
            }
        }
    }

    /// Returns whether anything is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.load_raw(key).is_some()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::StorageAdapter;
    use crate::storage::{KeyValueStore, MemoryStore};
    use serde_json::json;

    #[test]
    fn load_falls_back_to_default_on_corrupt_json() {
        let store = MemoryStore::new();
        store.set("numbers", "[1, 2,").unwrap();
        let adapter = StorageAdapter::new(&store);

        let loaded: Vec<u32> = adapter.load("numbers", vec![7]);
        assert_eq!(loaded, vec![7]);
    }

    #[test]
    fn load_collection_ignores_non_array_values() {
        let store = MemoryStore::new();
        store.set("things", "{\"a\": 1}").unwrap();
        let adapter = StorageAdapter::new(&store);

        assert!(adapter.load_collection("things").is_empty());
        assert!(adapter.load_collection("missing").is_empty());
    }

    #[test]
    fn save_reports_quota_failure_without_panicking() {
        let store = MemoryStore::with_quota(8);
        let adapter = StorageAdapter::new(&store);

        let outcome = adapter.save("payload", &json!(["a long enough value"]));
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("quota"));
        assert!(!adapter.contains("payload"));
    }
}
