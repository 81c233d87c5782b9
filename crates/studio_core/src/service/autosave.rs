//! Debounced draft auto-save.
//!
//! # Responsibility
//! - Coalesce edit events into one `save_draft` call per idle window.
//!
//! # Invariants
//! - At most one save is pending; a new edit replaces it and restarts the window.
//! - Save failures are logged, never returned to the editor.
//! - Dropping the saver discards the pending save.
//!
//! Time is supplied by the caller so the debouncer stays single-threaded and
//! deterministic.

use crate::model::draft::Draft;
use crate::service::draft_service::DraftService;
use crate::storage::KeyValueStore;
use log::{debug, error, info};
use std::time::{Duration, Instant};

/// Idle window used when none is configured.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug)]
struct PendingSave {
    draft: Draft,
    due_at: Instant,
}

/// Edit-event debouncer in front of `DraftService::save_draft`.
#[derive(Debug)]
pub struct AutoSaver {
    delay: Duration,
    pending: Option<PendingSave>,
}

impl Default for AutoSaver {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}

impl AutoSaver {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `draft` for saving one idle window after `now`.
    pub fn record_edit(&mut self, draft: Draft, now: Instant) {
        if self.pending.is_some() {
            debug!(
                "event=autosave module=autosave status=restarted draft_id={}",
                draft.id
            );
        }
        self.pending = Some(PendingSave {
            draft,
            due_at: now + self.delay,
        });
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Instant the pending save becomes due.
    pub fn due_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due_at)
    }

    /// Saves the pending draft once its window has elapsed at `now`.
    ///
    /// Returns the saved draft; `None` when nothing was due or saving failed.
    pub fn poll<S: KeyValueStore>(
        &mut self,
        now: Instant,
        drafts: &DraftService<S>,
    ) -> Option<Draft> {
        let due = self.due_at().is_some_and(|due_at| now >= due_at);
        if !due {
            return None;
        }
        self.flush(drafts)
    }

    /// Saves the pending draft immediately, regardless of the window.
    pub fn flush<S: KeyValueStore>(&mut self, drafts: &DraftService<S>) -> Option<Draft> {
        let pending = self.pending.take()?;
        match drafts.save_draft(&pending.draft) {
            Ok(saved) => {
                info!(
                    "event=autosave module=autosave status=ok draft_id={}",
                    saved.id
                );
                Some(saved)
            }
            Err(err) => {
                error!(
                    "event=autosave module=autosave status=error draft_id={} error={}",
                    pending.draft.id, err
                );
                None
            }
        }
    }

    /// Discards the pending save. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(
                "event=autosave module=autosave status=cancelled reason=teardown draft_id={}",
                pending.draft.id
            );
        }
    }
}
