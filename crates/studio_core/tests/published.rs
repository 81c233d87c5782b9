use studio_core::storage::PUBLISHED_KEY;
use studio_core::{
    Draft, KeyValueStore, MemoryStore, PublishService, PublishedArticle, StorageAdapter,
};

fn service(store: &MemoryStore) -> PublishService<&MemoryStore> {
    PublishService::new(StorageAdapter::new(store))
}

#[test]
fn add_is_idempotent_by_id() {
    let store = MemoryStore::new();
    let published = service(&store);
    let draft = Draft::new("<h1>Launch</h1><p>notes</p>");
    let article = PublishedArticle::from_draft(&draft, Some("default".to_string()));

    assert!(published.add_published(article.clone()));
    assert!(!published.add_published(article.clone()));

    let all = published.get_published();
    assert_eq!(all, vec![article.clone()]);
    assert_eq!(all[0].title, "Launch");
    assert_eq!(all[0].original_draft_id, draft.id);
    assert_eq!(published.get_published_article(&article.id), Some(article));
}

#[test]
fn log_preserves_insertion_order_and_supports_delete() {
    let store = MemoryStore::new();
    let published = service(&store);
    let first = PublishedArticle::from_draft(&Draft::new("<p>one</p>"), None);
    let second = PublishedArticle::from_draft(&Draft::new("<p>two</p>"), None);
    published.add_published(first.clone());
    published.add_published(second.clone());

    assert!(published.delete_published(&first.id));
    assert!(!published.delete_published(&first.id));
    assert_eq!(published.get_published(), vec![second]);
}

#[test]
fn theme_id_is_optional_in_storage() {
    let store = MemoryStore::new();
    store
        .set(
            PUBLISHED_KEY,
            r#"[{"id":"p1","originalDraftId":"d1","title":"T","content":"<p>c</p>","publishedAt":1}]"#,
        )
        .unwrap();
    let published = service(&store);

    let article = published.get_published_article("p1").unwrap();
    assert_eq!(article.theme_id, None);

    let json = serde_json::to_string(&article).unwrap();
    assert!(!json.contains("themeId"));
}

#[test]
fn blank_id_is_rejected_instead_of_vanishing_later() {
    let store = MemoryStore::new();
    let published = service(&store);
    let mut article = PublishedArticle::from_draft(&Draft::new("<p>body</p>"), None);
    article.id = "  ".to_string();

    assert!(!published.add_published(article));
    assert!(published.get_published().is_empty());
    assert_eq!(store.get(PUBLISHED_KEY).unwrap(), None);
}
