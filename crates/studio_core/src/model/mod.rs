//! Persistent content-and-style model.
//!
//! # Responsibility
//! - Define the records stored in the key-value collections.
//! - Keep JSON field naming stable (`camelCase`) across releases.
//!
//! # Invariants
//! - Every record is identified by a non-blank string id.
//! - Cross-collection references are by id only (e.g. `PublishedArticle::theme_id`).

use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub mod draft;
pub mod icon;
mod lenient;
pub mod published;
pub mod theme;

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

/// Generates a time-derived id such as `draft_1718000000000_3f2a9c1d`.
///
/// The random suffix keeps ids unique when two records are created in the
/// same millisecond.
pub fn generate_id(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}_{}", now_epoch_ms(), &suffix[..8])
}
