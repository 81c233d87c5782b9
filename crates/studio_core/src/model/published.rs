//! Published article record.

use crate::heal::Entity;
use crate::model::draft::Draft;
use crate::model::{generate_id, now_epoch_ms};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a draft at publish time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedArticle {
    pub id: String,
    #[serde(default, deserialize_with = "crate::model::lenient::text")]
    pub original_draft_id: String,
    #[serde(default, deserialize_with = "crate::model::lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "crate::model::lenient::text")]
    pub content: String,
    /// Unix epoch milliseconds.
    #[serde(default, deserialize_with = "crate::model::lenient::epoch_ms")]
    pub published_at: i64,
    #[serde(
        default,
        deserialize_with = "crate::model::lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub theme_id: Option<String>,
}

impl PublishedArticle {
    /// Snapshots `draft` with a fresh id and the current time.
    pub fn from_draft(draft: &Draft, theme_id: Option<String>) -> Self {
        Self {
            id: generate_id("published"),
            original_draft_id: draft.id.clone(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            published_at: now_epoch_ms(),
            theme_id,
        }
    }
}

impl Entity for PublishedArticle {
    fn entity_id(&self) -> &str {
        &self.id
    }
}
