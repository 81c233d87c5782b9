//! Key-value storage boundary.
//!
//! # Responsibility
//! - Define the backend contract every collection is persisted through.
//! - Provide in-memory and SQLite backends plus the typed JSON adapter.
//!
//! # Invariants
//! - Backends store opaque UTF-8 strings; JSON encoding lives in the adapter.
//! - Services never talk to a backend directly, only through `StorageAdapter`.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub mod adapter;
pub mod memory;
pub mod sqlite;

pub use adapter::{SaveOutcome, StorageAdapter};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key of the JSON-encoded `Draft[]` collection.
pub const DRAFTS_KEY: &str = "drafts";
/// Key of the raw current-draft id pointer.
pub const CURRENT_DRAFT_KEY: &str = "current_draft_id";
/// Key of the JSON-encoded `Theme[]` collection.
pub const THEMES_KEY: &str = "themes";
/// Key of the raw active-theme id pointer.
pub const ACTIVE_THEME_KEY: &str = "active_theme_id";
/// Key of the JSON-encoded `Icon[]` collection.
pub const ICONS_KEY: &str = "icons";
/// Key of the JSON-encoded `PublishedArticle[]` collection.
pub const PUBLISHED_KEY: &str = "published_articles";

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer failures. Always absorbed by `StorageAdapter`.
#[derive(Debug)]
pub enum StorageError {
    /// Value could not be encoded or decoded as JSON.
    Serialize(serde_json::Error),
    /// Backend transport failure.
    Backend(String),
    /// Write rejected because the backend is full.
    QuotaExceeded { key: String, limit_bytes: usize },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "json encoding failed: {err}"),
            Self::Backend(message) => write!(f, "storage backend failure: {message}"),
            Self::QuotaExceeded { key, limit_bytes } => {
                write!(f, "storage quota of {limit_bytes} bytes exceeded writing `{key}`")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Backend(value.to_string())
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Backend(value.to_string())
    }
}

/// Synchronous string key-value backend.
///
/// Methods take `&self` so one backend can be shared by every service.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
    /// Returns all keys in ascending order.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        (**self).keys()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        (**self).keys()
    }
}
