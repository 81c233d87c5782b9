//! SQLite file layer under `SqliteStore`.
//!
//! The store keeps every collection and pointer as one row of
//! `kv_entries(key, value, updated_at)`: `key` is a storage key such as
//! `drafts`, `value` the JSON (or raw pointer) text, `updated_at` the last
//! write in epoch ms.
//!
//! # Invariants
//! - `PRAGMA user_version` records the applied migration.
//! - A connection handed out by `open_db*` is migrated and has a
//!   `kv_entries` table; a file claiming the current version without it is
//!   rejected instead of patched.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Table holding every stored key.
pub const KV_TABLE: &str = "kv_entries";

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening a store file.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build.
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
    /// The file reports a known version but lacks the key-value table.
    MissingTable { table: &'static str, db_version: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "store file: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "store file uses schema {db_version}; this build reads up to {latest_supported}"
            ),
            Self::MissingTable { table, db_version } => write!(
                f,
                "store file at schema {db_version} has no `{table}` table"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        if let Self::Sqlite(err) = self {
            return Some(err);
        }
        None
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
