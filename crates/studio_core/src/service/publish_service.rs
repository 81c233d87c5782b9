//! Published-article log.
//!
//! # Invariants
//! - Append-only: articles are added or deleted, never updated.
//! - Ids are non-blank and unique; adding a blank or known id is a no-op.

use crate::heal::repair_collection;
use crate::model::published::PublishedArticle;
use crate::storage::{KeyValueStore, SaveOutcome, StorageAdapter, PUBLISHED_KEY};
use log::{info, warn};

/// Publish service over an injected storage adapter.
pub struct PublishService<S: KeyValueStore> {
    storage: StorageAdapter<S>,
}

impl<S: KeyValueStore> PublishService<S> {
    pub fn new(storage: StorageAdapter<S>) -> Self {
        Self { storage }
    }

    pub fn get_published(&self) -> Vec<PublishedArticle> {
        self.load_published()
    }

    pub fn get_published_article(&self, id: &str) -> Option<PublishedArticle> {
        self.load_published()
            .into_iter()
            .find(|article| article.id == id)
    }

    /// Appends `article` unless its id is blank or already present.
    ///
    /// Returns whether the article was appended.
    pub fn add_published(&self, article: PublishedArticle) -> bool {
        if article.id.trim().is_empty() {
            warn!(
                "event=publish_add module=publish status=rejected reason=blank_id draft_id={}",
                article.original_draft_id
            );
            return false;
        }
        let mut published = self.load_published();
        if published.iter().any(|existing| existing.id == article.id) {
            return false;
        }
        info!(
            "event=publish_add module=publish status=ok article_id={} draft_id={}",
            article.id, article.original_draft_id
        );
        published.push(article);
        self.persist(&published).is_ok()
    }

    /// Removes article `id`. Returns whether an article was removed.
    pub fn delete_published(&self, id: &str) -> bool {
        let mut published = self.load_published();
        let before = published.len();
        published.retain(|article| article.id != id);
        if published.len() == before {
            return false;
        }
        info!("event=publish_delete module=publish status=ok article_id={}", id);
        self.persist(&published).is_ok()
    }

    fn load_published(&self) -> Vec<PublishedArticle> {
        let repaired = repair_collection::<PublishedArticle>(
            PUBLISHED_KEY,
            self.storage.load_collection(PUBLISHED_KEY),
        );
        if repaired.changed() {
            self.persist(&repaired.items);
        }
        repaired.items
    }

    fn persist(&self, published: &[PublishedArticle]) -> SaveOutcome {
        self.storage.save(PUBLISHED_KEY, published)
    }
}
