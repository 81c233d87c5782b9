//! Draft use-case service.
//!
//! # Responsibility
//! - Own the draft collection and the current-draft pointer.
//! - Keep derived titles and timestamps consistent on every write.
//! - Prune orphan drafts and keep the pointer resolvable.
//!
//! # Invariants
//! - `title` is always recomputed from `content` before persistence.
//! - After `delete_draft`, a set current-draft pointer resolves to an
//!   existing draft.
//! - The collection is repaired on every load and re-persisted when repaired.

use crate::heal::{repair_collection, repair_pointer, PointerRepair};
use crate::markup::{is_orphan_content, EMPTY_PARAGRAPH};
use crate::model::draft::Draft;
use crate::model::{generate_id, now_epoch_ms};
use crate::storage::{
    KeyValueStore, SaveOutcome, StorageAdapter, CURRENT_DRAFT_KEY, DRAFTS_KEY,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for draft writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// The draft collection could not be written; carries the storage message.
    NotPersisted(String),
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPersisted(message) => write!(f, "draft was not persisted: {message}"),
        }
    }
}

impl Error for DraftError {}

impl From<SaveOutcome> for DraftError {
    fn from(value: SaveOutcome) -> Self {
        Self::NotPersisted(value.error.unwrap_or_else(|| "unknown storage failure".to_string()))
    }
}

/// Draft service over an injected storage adapter.
pub struct DraftService<S: KeyValueStore> {
    storage: StorageAdapter<S>,
}

impl<S: KeyValueStore> DraftService<S> {
    pub fn new(storage: StorageAdapter<S>) -> Self {
        Self { storage }
    }

    /// Creates, appends, and persists a draft for `content`.
    pub fn create_draft(&self, content: impl Into<String>) -> Result<Draft, DraftError> {
        let draft = Draft::new(content);
        let mut drafts = self.load_drafts();
        drafts.push(draft.clone());
        self.persist(&drafts)?;

        info!(
            "event=draft_create module=draft status=ok draft_id={} content_len={}",
            draft.id,
            draft.content.len()
        );
        Ok(draft)
    }

    /// Upserts `draft` by id after recomputing its title and `updated_at`.
    ///
    /// A draft without an id receives a fresh one instead of being lost to
    /// the next repair pass.
    pub fn save_draft(&self, draft: &Draft) -> Result<Draft, DraftError> {
        let mut saved = draft.clone();
        if saved.id.trim().is_empty() {
            saved.id = generate_id("draft");
            warn!(
                "event=draft_save module=draft status=repaired reason=blank_id draft_id={}",
                saved.id
            );
        }
        saved.refresh_title();
        saved.updated_at = now_epoch_ms().max(saved.created_at);

        let mut drafts = self.load_drafts();
        match drafts.iter_mut().find(|existing| existing.id == saved.id) {
            Some(existing) => *existing = saved.clone(),
            None => drafts.push(saved.clone()),
        }
        self.persist(&drafts)?;
        Ok(saved)
    }

    pub fn get_draft(&self, id: &str) -> Option<Draft> {
        self.load_drafts().into_iter().find(|draft| draft.id == id)
    }

    pub fn get_drafts(&self) -> Vec<Draft> {
        self.load_drafts()
    }

    pub fn set_current_draft_id(&self, id: &str) -> SaveOutcome {
        self.storage.save_raw(CURRENT_DRAFT_KEY, id)
    }

    /// Returns the stored pointer; blank values read as unset.
    pub fn get_current_draft_id(&self) -> Option<String> {
        self.storage
            .load_raw(CURRENT_DRAFT_KEY)
            .filter(|id| !id.trim().is_empty())
    }

    pub fn clear_current_draft_id(&self) -> bool {
        self.storage.remove(CURRENT_DRAFT_KEY)
    }

    /// Returns the current draft, creating or adopting one when the pointer
    /// is unset or dangling.
    pub fn ensure_current_draft(&self) -> Result<Draft, DraftError> {
        let drafts = self.load_drafts();
        if let Some(id) = self.get_current_draft_id() {
            if let Some(draft) = drafts.iter().find(|draft| draft.id == id) {
                return Ok(draft.clone());
            }
        }

        let draft = match drafts.into_iter().next() {
            Some(first) => first,
            None => self.create_draft(EMPTY_PARAGRAPH)?,
        };
        self.set_current_draft_id(&draft.id);
        Ok(draft)
    }

    /// Removes the draft with `id`. Returns whether a draft was removed.
    ///
    /// Deleting the current draft moves the pointer to the first remaining
    /// draft, or to a fresh empty draft when none remain. When nothing
    /// matches, the repaired collection is re-persisted so a corrupted entry
    /// cannot linger.
    pub fn delete_draft(&self, id: &str) -> bool {
        let mut drafts = self.load_drafts();
        let before = drafts.len();
        drafts.retain(|draft| draft.id != id);

        if drafts.len() == before {
            warn!(
                "event=draft_delete module=draft status=not_found draft_id={} fallback=purge_malformed",
                id
            );
            if let Err(err) = self.persist(&drafts) {
                warn!(
                    "event=draft_delete module=draft status=error draft_id={} error={}",
                    id, err
                );
            }
            return false;
        }

        if self.persist(&drafts).is_err() {
            return false;
        }
        info!("event=draft_delete module=draft status=ok draft_id={}", id);

        if self.get_current_draft_id().as_deref() == Some(id) {
            let next = match drafts.first() {
                Some(first) => Some(first.id.clone()),
                None => self.create_draft(EMPTY_PARAGRAPH).ok().map(|draft| draft.id),
            };
            match next {
                Some(next_id) => {
                    self.set_current_draft_id(&next_id);
                }
                None => {
                    self.clear_current_draft_id();
                }
            }
        }
        true
    }

    /// Removes drafts without meaningful text and repairs the pointer.
    ///
    /// Returns the number of drafts removed. When the shrunken collection
    /// cannot be written, nothing counts as removed and the pointer is left
    /// alone.
    pub fn clean_orphan_drafts(&self) -> usize {
        let mut drafts = self.load_drafts();
        let before = drafts.len();
        drafts.retain(|draft| !is_orphan_content(&draft.content));
        let removed = before - drafts.len();

        if removed > 0 {
            if let Err(err) = self.persist(&drafts) {
                warn!(
                    "event=draft_clean_orphans module=draft status=error removed=0 error={}",
                    err
                );
                return 0;
            }
            info!(
                "event=draft_clean_orphans module=draft status=ok removed={} remaining={}",
                removed,
                drafts.len()
            );
        }

        if let Some(current) = self.get_current_draft_id() {
            let ids = drafts.iter().map(|draft| draft.id.as_str());
            match repair_pointer(Some(current.as_str()), ids) {
                PointerRepair::Keep => {}
                PointerRepair::Repoint(next_id) => {
                    self.set_current_draft_id(&next_id);
                }
                PointerRepair::Clear => {
                    self.clear_current_draft_id();
                }
            }
        }
        removed
    }

    fn load_drafts(&self) -> Vec<Draft> {
        let repaired = repair_collection::<Draft>(DRAFTS_KEY, self.storage.load_collection(DRAFTS_KEY));
        if repaired.changed() {
            if let Err(err) = self.persist(&repaired.items) {
                warn!(
                    "event=heal_collection module=draft status=error collection={} error={}",
                    DRAFTS_KEY, err
                );
            }
        }
        repaired.items
    }

    fn persist(&self, drafts: &[Draft]) -> Result<(), DraftError> {
        let outcome = self.storage.save(DRAFTS_KEY, drafts);
        if outcome.is_ok() {
            Ok(())
        } else {
            Err(outcome.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DraftService;
    use crate::storage::{KeyValueStore, MemoryStore, StorageAdapter, DRAFTS_KEY};

    #[test]
    fn blank_id_draft_is_saved_under_a_fresh_id() {
        let store = MemoryStore::new();
        let service = DraftService::new(StorageAdapter::new(&store));
        let mut draft = service.create_draft("<p>seed</p>").unwrap();
        draft.id = "   ".to_string();

        let saved = service.save_draft(&draft).unwrap();
        assert!(saved.id.starts_with("draft_"));
        assert_eq!(service.get_drafts().len(), 2);
    }

    #[test]
    fn corrupted_entries_are_purged_on_load() {
        let store = MemoryStore::new();
        store
            .set(
                DRAFTS_KEY,
                r#"[{"id":"ok","content":"<p>a</p>"},{"id":null,"content":"x"},{"id":"ok","content":"dup"}]"#,
            )
            .unwrap();
        let service = DraftService::new(StorageAdapter::new(&store));

        let drafts = service.get_drafts();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].content, "<p>a</p>");
        let persisted = store.get(DRAFTS_KEY).unwrap().unwrap();
        assert!(!persisted.contains("dup"));
    }
}
