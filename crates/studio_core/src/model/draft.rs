//! Draft record.
//!
//! # Invariants
//! - `title` is derived from `content` and never authored independently.
//! - `updated_at >= created_at`.

use crate::heal::Entity;
use crate::markup::extract_title;
use crate::model::{generate_id, now_epoch_ms};
use serde::{Deserialize, Serialize};

/// Unpublished article body with derived title and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    /// Recomputed from `content` on every save.
    #[serde(default, deserialize_with = "crate::model::lenient::text")]
    pub title: String,
    /// Serialized rich-text markup.
    #[serde(default, deserialize_with = "crate::model::lenient::text")]
    pub content: String,
    /// Unix epoch milliseconds.
    #[serde(default, deserialize_with = "crate::model::lenient::epoch_ms")]
    pub created_at: i64,
    /// Unix epoch milliseconds.
    #[serde(default, deserialize_with = "crate::model::lenient::epoch_ms")]
    pub updated_at: i64,
}

impl Draft {
    /// Creates a draft with a fresh id, derived title, and current timestamps.
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let now = now_epoch_ms();
        Self {
            id: generate_id("draft"),
            title: extract_title(&content),
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recomputes `title` from the current `content`.
    pub fn refresh_title(&mut self) {
        self.title = extract_title(&self.content);
    }
}

impl Entity for Draft {
    fn entity_id(&self) -> &str {
        &self.id
    }
}
