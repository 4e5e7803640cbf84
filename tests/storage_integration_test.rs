//! Integration tests for the link store backends
//!
//! Every check runs against SQLite (in-memory) and the memory backend.
//! PostgreSQL runs when DATABASE_URL points at a server.
//!
//! Tests can be filtered by database backend using the DATABASE_BACKEND environment variable:
//! - `DATABASE_BACKEND=sqlite cargo test` - Run only SQLite tests
//! - `DATABASE_BACKEND=postgres cargo test` - Run only PostgreSQL tests
//! - By default, all backends are tested

use std::sync::Arc;
use std::time::Duration;

use tinylink::storage::{MemoryStorage, PostgresStorage, SqliteStorage, Storage, StorageError};

/// Get the database backend to test from environment variable
fn should_test_backend(backend: &str) -> bool {
    match std::env::var("DATABASE_BACKEND") {
        Ok(val) => val.to_lowercase() == backend.to_lowercase(),
        Err(_) => true, // Test all backends if not specified
    }
}

/// Codes are prefixed so tests sharing a PostgreSQL database don't collide
fn unique_prefix(name: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{name}_{nanos}_")
}

async fn create_sqlite_storage() -> Arc<dyn Storage> {
    let storage = SqliteStorage::new("sqlite::memory:", 5, Duration::from_secs(5))
        .await
        .unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

async fn create_memory_storage() -> Arc<dyn Storage> {
    let storage = MemoryStorage::new();
    storage.init().await.unwrap();
    Arc::new(storage)
}

async fn create_postgres_storage() -> Option<Arc<dyn Storage>> {
    let db_url = std::env::var("DATABASE_URL").ok()?;
    if !db_url.starts_with("postgres") {
        return None;
    }
    let storage = PostgresStorage::new(&db_url, 5, Duration::from_secs(5))
        .await
        .ok()?;
    storage.init().await.ok()?;
    Some(Arc::new(storage))
}

async fn check_create_then_get(storage: Arc<dyn Storage>) {
    let code = format!("{}go", unique_prefix("create_get"));

    let created = storage.create(&code, "https://golang.org").await.unwrap();
    assert_eq!(created.code, code);
    assert_eq!(created.click_count, 0);
    assert_eq!(created.last_clicked_at, None);

    let fetched = storage.get(&code).await.unwrap().expect("link should exist");
    assert_eq!(fetched, created);
}

async fn check_duplicate_create_keeps_first(storage: Arc<dyn Storage>) {
    let code = format!("{}dup", unique_prefix("duplicate"));

    let first = storage.create(&code, "https://first.example").await.unwrap();
    let second = storage.create(&code, "https://second.example").await;
    assert!(matches!(second, Err(StorageError::Conflict)));

    let stored = storage.get(&code).await.unwrap().unwrap();
    assert_eq!(stored, first);
    assert_eq!(stored.target_url, "https://first.example");
}

async fn check_concurrent_create(storage: Arc<dyn Storage>) {
    let code = format!("{}same", unique_prefix("concurrent_create"));

    let mut handles = vec![];

    // Try to create the same code concurrently
    for i in 0..10 {
        let storage_clone = Arc::clone(&storage);
        let code = code.clone();
        let handle = tokio::spawn(async move {
            storage_clone
                .create(&code, &format!("https://example.com/{i}"))
                .await
        });
        handles.push(handle);
    }

    // Exactly one should succeed, others should get Conflict error
    let mut success_count = 0;
    let mut conflict_count = 0;

    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => success_count += 1,
            Err(StorageError::Conflict) => conflict_count += 1,
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    assert_eq!(success_count, 1, "Exactly one creation should succeed");
    assert_eq!(conflict_count, 9, "All others should get conflict");
}

async fn check_concurrent_resolve_counts_every_click(storage: Arc<dyn Storage>) {
    let code = format!("{}hot", unique_prefix("concurrent_resolve"));
    storage.create(&code, "https://hot.example").await.unwrap();

    let started_at = chrono::Utc::now().timestamp();
    let mut handles = vec![];

    for _ in 0..50 {
        let storage_clone = Arc::clone(&storage);
        let code = code.clone();
        handles.push(tokio::spawn(async move {
            storage_clone.resolve_and_record_click(&code).await
        }));
    }

    for handle in handles {
        let target = handle.await.unwrap().unwrap();
        assert_eq!(target.as_deref(), Some("https://hot.example"));
    }

    let link = storage.get(&code).await.unwrap().unwrap();
    assert_eq!(link.click_count, 50, "No click should be lost");
    let last = link.last_clicked_at.expect("last click should be recorded");
    assert!(last >= started_at);
}

async fn check_resolve_missing_creates_nothing(storage: Arc<dyn Storage>) {
    let code = format!("{}ghost", unique_prefix("resolve_missing"));

    let target = storage.resolve_and_record_click(&code).await.unwrap();
    assert_eq!(target, None);
    assert_eq!(storage.get(&code).await.unwrap(), None);
}

async fn check_delete(storage: Arc<dyn Storage>) {
    let code = format!("{}bye", unique_prefix("delete"));
    storage.create(&code, "https://bye.example").await.unwrap();
    storage.resolve_and_record_click(&code).await.unwrap();

    storage.delete(&code).await.unwrap();
    assert_eq!(storage.get(&code).await.unwrap(), None);
    assert_eq!(storage.resolve_and_record_click(&code).await.unwrap(), None);

    // Deleting again reports the code as missing
    assert!(matches!(
        storage.delete(&code).await,
        Err(StorageError::NotFound)
    ));

    // The code can be reused with fresh statistics
    let recreated = storage.create(&code, "https://again.example").await.unwrap();
    assert_eq!(recreated.click_count, 0);
    assert_eq!(recreated.last_clicked_at, None);
}

async fn check_list_most_recent_first(storage: Arc<dyn Storage>) {
    let prefix = unique_prefix("list");
    for name in ["a", "b", "c"] {
        storage
            .create(&format!("{prefix}{name}"), "https://example.com")
            .await
            .unwrap();
    }

    let codes: Vec<String> = storage
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter_map(|link| link.code.strip_prefix(&prefix).map(str::to_string))
        .collect();

    assert_eq!(codes, vec!["c", "b", "a"]);
}

async fn check_reads_do_not_count_clicks(storage: Arc<dyn Storage>) {
    let code = format!("{}quiet", unique_prefix("reads"));
    storage.create(&code, "https://quiet.example").await.unwrap();

    for _ in 0..3 {
        storage.get(&code).await.unwrap();
        storage.list().await.unwrap();
    }

    let link = storage.get(&code).await.unwrap().unwrap();
    assert_eq!(link.click_count, 0);
    assert_eq!(link.last_clicked_at, None);
}

macro_rules! backend_tests {
    ($backend:ident, $name:literal, $setup:expr) => {
        mod $backend {
            use super::*;

            async fn setup() -> Option<Arc<dyn Storage>> {
                if !should_test_backend($name) {
                    return None;
                }
                $setup
            }

            #[tokio::test]
            async fn test_create_then_get() {
                if let Some(storage) = setup().await {
                    check_create_then_get(storage).await;
                }
            }

            #[tokio::test]
            async fn test_duplicate_create_keeps_first() {
                if let Some(storage) = setup().await {
                    check_duplicate_create_keeps_first(storage).await;
                }
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn test_concurrent_create() {
                if let Some(storage) = setup().await {
                    check_concurrent_create(storage).await;
                }
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn test_concurrent_resolve_counts_every_click() {
                if let Some(storage) = setup().await {
                    check_concurrent_resolve_counts_every_click(storage).await;
                }
            }

            #[tokio::test]
            async fn test_resolve_missing_creates_nothing() {
                if let Some(storage) = setup().await {
                    check_resolve_missing_creates_nothing(storage).await;
                }
            }

            #[tokio::test]
            async fn test_delete() {
                if let Some(storage) = setup().await {
                    check_delete(storage).await;
                }
            }

            #[tokio::test]
            async fn test_list_most_recent_first() {
                if let Some(storage) = setup().await {
                    check_list_most_recent_first(storage).await;
                }
            }

            #[tokio::test]
            async fn test_reads_do_not_count_clicks() {
                if let Some(storage) = setup().await {
                    check_reads_do_not_count_clicks(storage).await;
                }
            }
        }
    };
}

backend_tests!(sqlite, "sqlite", Some(create_sqlite_storage().await));
backend_tests!(memory, "memory", Some(create_memory_storage().await));
backend_tests!(postgres, "postgres", create_postgres_storage().await);
