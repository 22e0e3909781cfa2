//! Shared test utilities for namespace integration tests
#![allow(dead_code)]

use common::prelude::*;
use tempfile::TempDir;

pub const COLLECTION: &str = "public";

/// Root view of the collection seeded by [`seed`].
pub const SEEDED_VIEW: &str = "Neo\nanswer\nme\n  and\nmust\n  have\n    been\n      like\n";

/// Open a file-backed engine in a fresh temp dir, with an empty
/// `public` collection. The temp dir must outlive the store.
pub async fn setup_test_env() -> (NamespaceStore, ShareManager, TempDir) {
    init_tracing();

    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(&temp_dir.path().join("dbfs.sqlite"))
        .await
        .unwrap();

    let store = NamespaceStore::new(db.clone());
    let shares = ShareManager::new(db);
    store.create(COLLECTION).await.unwrap();

    (store, shares, temp_dir)
}

/// Same as [`setup_test_env`], with the `public` collection populated.
pub async fn setup_seeded_env() -> (NamespaceStore, ShareManager, TempDir) {
    let (store, shares, temp_dir) = setup_test_env().await;
    seed(&store, COLLECTION).await;
    (store, shares, temp_dir)
}

pub async fn seed(store: &NamespaceStore, collection: &str) {
    for (path, content) in [
        ("Neo", "Wake up"),
        ("answer", "42"),
        ("me/and", "you"),
        ("must/have/been/like", "the wind"),
    ] {
        store
            .put(collection, &NodePath::parse(path), content.as_bytes())
            .await
            .unwrap();
    }
}

pub async fn view(store: &NamespaceStore, collection: &str, path: &str) -> String {
    let bytes = store
        .get(collection, &NodePath::parse(path))
        .await
        .unwrap();
    String::from_utf8(bytes).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
