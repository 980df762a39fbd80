use repository::{Backends, MemoryStore, SqliteStore};
use service::{Error, bind_publish_article, bind_publish_credited, bind_reassign};
use uuid::Uuid;

fn memory() -> Backends {
    let store = MemoryStore::new();
    store.add_author(42, "Ada");
    Backends::new(store)
}

#[test]
fn test_publish_random_article() {
    let backends = memory();
    let publish = bind_publish_article(&backends.module()).unwrap();

    assert!(publish.call(None).unwrap());
    assert_eq!(backends.memory().published().len(), 1);

    let uuid = Uuid::new_v4();
    assert!(publish.call(Some(uuid)).unwrap());
    assert_eq!(backends.memory().published()[1], uuid);
}

#[test]
fn test_bound_signature_is_introspectable() {
    let publish = bind_publish_article(&memory().module()).unwrap();
    assert!(publish.name().ends_with("publish_article_if_exists_or_random"));
    assert_eq!(publish.allow_list().to_string(), "[article]");
}

#[test]
fn test_publish_credited() {
    let backends = memory();
    let credit = bind_publish_credited(&backends.module()).unwrap();

    assert!(credit.call((None, 42)).unwrap());
    assert_eq!(backends.memory().published().len(), 1);

    let err = credit.call((None, 7)).unwrap_err();
    assert!(matches!(err, Error::Repository(repository::Error::NotFound(_))));
    assert_eq!(backends.memory().published().len(), 1);
}

#[test]
fn test_binding_twice_on_one_module_fails() {
    let backends = memory();
    let module = backends.module();

    bind_publish_article(&module).unwrap();
    let err = bind_publish_article(&module).unwrap_err();
    assert!(matches!(err, binder::Error::AlreadyBound { .. }));

    // A separate module keeps its own bindings.
    assert!(bind_publish_article(&backends.module()).is_ok());
}

#[tokio::test]
async fn test_reassign_is_not_granted_articles() {
    let backends = memory();
    let reassign = bind_reassign(&backends.module()).unwrap();

    let err = reassign.call((42, "Notes".to_string())).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Binding(binder::Error::CapabilityNotGranted { ref name }) if name == "article"
    ));
    assert!(backends.memory().published().is_empty());
}

#[tokio::test]
async fn test_concurrent_calls_use_separate_binders() {
    let backends = memory();
    let publish = std::sync::Arc::new(bind_publish_article(&backends.module()).unwrap());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let publish = publish.clone();
            tokio::spawn(async move { publish.call(None) })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().unwrap());
    }

    assert_eq!(backends.memory().published().len(), 8);
}

#[test]
fn test_publish_through_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("articles.db");
    let uuid = Uuid::new_v4();
    SqliteStore::open(&path).unwrap().add_article(uuid, "Notes").unwrap();

    let backends = Backends::new(MemoryStore::new()).with_sqlite(&path);
    let publish = bind_publish_article(&backends.module()).unwrap();

    assert!(publish.call(Some(uuid)).unwrap());
    assert!(!publish.call(None).unwrap(), "random uuid has no article");
    assert!(SqliteStore::open(&path).unwrap().published_at(uuid).unwrap().is_some());
    assert!(backends.memory().published().is_empty());
}
