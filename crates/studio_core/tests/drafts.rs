use std::cell::Cell;
use studio_core::storage::{StorageResult, CURRENT_DRAFT_KEY, DRAFTS_KEY};
use studio_core::{
    extract_title, DraftService, KeyValueStore, MemoryStore, StorageAdapter, StorageError,
    EMPTY_PARAGRAPH, UNTITLED_DRAFT,
};

fn service(store: &MemoryStore) -> DraftService<&MemoryStore> {
    DraftService::new(StorageAdapter::new(store))
}

#[test]
fn create_draft_uses_first_heading_as_title() {
    let store = MemoryStore::new();
    let drafts = service(&store);

    let draft = drafts.create_draft("<h2>My Title</h2><p>body</p>").unwrap();
    assert_eq!(draft.title, "My Title");
    assert_eq!(draft.created_at, draft.updated_at);
    assert_eq!(drafts.get_draft(&draft.id).unwrap(), draft);
}

#[test]
fn create_draft_without_heading_takes_first_thirty_chars() {
    let store = MemoryStore::new();
    let drafts = service(&store);
    let text = "just plain text with no heading that is longer than thirty characters";

    let draft = drafts.create_draft(text).unwrap();
    assert_eq!(draft.title, &text[..30]);
}

#[test]
fn title_always_matches_extraction_on_create_and_save() {
    let store = MemoryStore::new();
    let drafts = service(&store);
    let samples = [
        "",
        "<p><br></p>",
        "<h1></h1><h3>Later</h3>",
        "<div>  spaced\n\n  out   words </div>",
        "<h1>One</h1><h2>Two</h2>",
    ];

    for content in samples {
        let mut draft = drafts.create_draft(content).unwrap();
        assert_eq!(draft.title, extract_title(content));

        draft.title = "hand-written title".to_string();
        let saved = drafts.save_draft(&draft).unwrap();
        assert_eq!(saved.title, extract_title(content));
        assert_eq!(drafts.get_draft(&draft.id).unwrap().title, extract_title(content));
    }
}

#[test]
fn save_draft_upserts_by_id() {
    let store = MemoryStore::new();
    let drafts = service(&store);
    let mut draft = drafts.create_draft("<p>first</p>").unwrap();

    draft.content = "<h1>Renamed</h1>".to_string();
    let saved = drafts.save_draft(&draft).unwrap();
    assert_eq!(saved.title, "Renamed");
    assert!(saved.updated_at >= saved.created_at);
    assert_eq!(drafts.get_drafts().len(), 1);

    let mut unknown = saved.clone();
    unknown.id = "draft_external".to_string();
    drafts.save_draft(&unknown).unwrap();
    let ids: Vec<String> = drafts.get_drafts().into_iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![saved.id, "draft_external".to_string()]);
}

#[test]
fn deleting_current_draft_repoints_to_remaining_draft() {
    let store = MemoryStore::new();
    let drafts = service(&store);
    let first = drafts.create_draft("<p>one</p>").unwrap();
    let second = drafts.create_draft("<p>two</p>").unwrap();
    drafts.set_current_draft_id(&second.id);

    assert!(drafts.delete_draft(&second.id));
    assert_eq!(drafts.get_current_draft_id(), Some(first.id.clone()));
    assert!(drafts.get_draft(&second.id).is_none());
}

#[test]
fn deleting_last_current_draft_creates_fresh_empty_draft() {
    let store = MemoryStore::new();
    let drafts = service(&store);
    let only = drafts.create_draft("<p>only</p>").unwrap();
    drafts.set_current_draft_id(&only.id);

    assert!(drafts.delete_draft(&only.id));
    let current = drafts.get_current_draft_id().expect("pointer must stay set");
    let fresh = drafts.get_draft(&current).expect("pointer must resolve");
    assert_ne!(fresh.id, only.id);
    assert_eq!(fresh.content, EMPTY_PARAGRAPH);
    assert_eq!(fresh.title, UNTITLED_DRAFT);
}

#[test]
fn deleting_non_current_draft_leaves_pointer_alone() {
    let store = MemoryStore::new();
    let drafts = service(&store);
    let keep = drafts.create_draft("<p>keep</p>").unwrap();
    let drop = drafts.create_draft("<p>drop</p>").unwrap();
    drafts.set_current_draft_id(&keep.id);

    assert!(drafts.delete_draft(&drop.id));
    assert_eq!(drafts.get_current_draft_id(), Some(keep.id));
}

#[test]
fn deleting_unknown_id_purges_malformed_entries() {
    let store = MemoryStore::new();
    store
        .set(
            DRAFTS_KEY,
            r#"[{"id":"good","content":"<p>x</p>"},{"id":17,"content":"<p>poison</p>"},{"content":"<p>no id</p>"}]"#,
        )
        .unwrap();
    let drafts = service(&store);

    assert!(!drafts.delete_draft("missing"));
    let raw = store.get(DRAFTS_KEY).unwrap().unwrap();
    assert!(!raw.contains("poison"));
    assert!(!raw.contains("no id"));
    assert_eq!(drafts.get_drafts().len(), 1);
}

#[test]
fn clean_orphans_removes_only_textless_drafts() {
    let store = MemoryStore::new();
    let drafts = service(&store);
    let empty = drafts.create_draft("").unwrap();
    let blank_markup = drafts.create_draft("<p> </p><div></div>").unwrap();
    let placeholder = drafts.create_draft(EMPTY_PARAGRAPH).unwrap();
    let real = drafts.create_draft("<p>x</p>").unwrap();

    assert_eq!(drafts.clean_orphan_drafts(), 2);
    let remaining: Vec<String> = drafts.get_drafts().into_iter().map(|d| d.id).collect();
    assert_eq!(remaining, vec![placeholder.id, real.id]);
    assert!(drafts.get_draft(&empty.id).is_none());
    assert!(drafts.get_draft(&blank_markup.id).is_none());
}

#[test]
fn clean_orphans_repoints_or_clears_dangling_pointer() {
    let store = MemoryStore::new();
    let drafts = service(&store);
    let orphan = drafts.create_draft("").unwrap();
    let survivor = drafts.create_draft("<p>text</p>").unwrap();
    drafts.set_current_draft_id(&orphan.id);

    drafts.clean_orphan_drafts();
    assert_eq!(drafts.get_current_draft_id(), Some(survivor.id.clone()));

    let lonely_store = MemoryStore::new();
    let lonely = service(&lonely_store);
    let orphan = lonely.create_draft("<p></p>").unwrap();
    lonely.set_current_draft_id(&orphan.id);
    lonely.clean_orphan_drafts();
    assert_eq!(lonely.get_current_draft_id(), None);
    assert!(lonely_store.get(CURRENT_DRAFT_KEY).unwrap().is_none());
}

#[test]
fn ensure_current_draft_adopts_or_creates() {
    let store = MemoryStore::new();
    let drafts = service(&store);

    let created = drafts.ensure_current_draft().unwrap();
    assert_eq!(created.content, EMPTY_PARAGRAPH);
    assert_eq!(drafts.get_current_draft_id(), Some(created.id.clone()));
    assert_eq!(drafts.ensure_current_draft().unwrap().id, created.id);

    drafts.set_current_draft_id("dangling");
    assert_eq!(drafts.ensure_current_draft().unwrap().id, created.id);
}

#[test]
fn quota_failure_is_reported_not_panicked() {
    let store = MemoryStore::with_quota(64);
    let drafts = service(&store);

    let err = drafts
        .create_draft("<p>this content is long enough to blow through the tiny quota</p>")
        .unwrap_err();
    assert!(err.to_string().contains("quota"));
    assert!(drafts.get_drafts().is_empty());
}

#[test]
fn mistyped_timestamps_do_not_cost_a_draft() {
    let store = MemoryStore::new();
    store
        .set(
            DRAFTS_KEY,
            r#"[{"id":"d1","title":7,"content":"<p>Real text</p>","createdAt":"2024-01-01T00:00:00Z","updatedAt":null}]"#,
        )
        .unwrap();
    let drafts = service(&store);

    let loaded = drafts.get_drafts();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].content, "<p>Real text</p>");
    assert_eq!(loaded[0].created_at, 1_704_067_200_000);
    assert_eq!(loaded[0].updated_at, 0);
    assert!(store.get(DRAFTS_KEY).unwrap().unwrap().contains("Real text"));

    let saved = drafts.save_draft(&loaded[0]).unwrap();
    assert_eq!(saved.title, "Real text");
    assert!(saved.updated_at >= saved.created_at);
}

/// Memory store that rejects writes to one chosen key.
#[derive(Default)]
struct KeyFailingStore {
    inner: MemoryStore,
    failing_key: Cell<Option<&'static str>>,
}

impl KeyValueStore for KeyFailingStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.failing_key.get() == Some(key) {
            return Err(StorageError::Backend(format!("write to `{key}` refused")));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.remove(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.inner.keys()
    }
}

#[test]
fn unwritten_orphan_cleanup_keeps_pointer_on_stored_draft() {
    let store = KeyFailingStore::default();
    let drafts = DraftService::new(StorageAdapter::new(&store));
    let orphan = drafts.create_draft("<p></p>").unwrap();
    drafts.create_draft("<p>kept</p>").unwrap();
    drafts.set_current_draft_id(&orphan.id);

    store.failing_key.set(Some(DRAFTS_KEY));
    assert_eq!(drafts.clean_orphan_drafts(), 0);
    store.failing_key.set(None);

    assert_eq!(drafts.get_current_draft_id().as_deref(), Some(orphan.id.as_str()));
    assert!(drafts.get_draft(&orphan.id).is_some());
    assert_eq!(drafts.clean_orphan_drafts(), 1);
    assert_ne!(drafts.get_current_draft_id().as_deref(), Some(orphan.id.as_str()));
}
