//! Concurrent batches against one memory store
//!
//! Each batch owns its transaction handle; commits are serialized by the
//! store, so every batch sees a consistent keyspace.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use futures::future::join_all;
use kvbatch_core::{BatchBuilder, StoreClient, Value};
use kvbatch_store::{Entry, MemoryStore};

async fn bump(store: Arc<dyn StoreClient>, worker: usize) -> Vec<Value> {
    let mut batch = BatchBuilder::new(store);
    batch
        .call("incr", ["counter"])
        .unwrap()
        .call("rpush", vec![Value::from("log"), Value::from(worker)])
        .unwrap()
        .call("get", ["counter"])
        .unwrap();
    batch.commit().await.unwrap()
}

#[tokio::test]
async fn test_joined_batches_are_isolated() {
    // GIVEN 16 batches over one store
    let store = Arc::new(MemoryStore::new());
    let client: Arc<dyn StoreClient> = store.clone();

    // WHEN they commit concurrently
    let results = join_all((0..16).map(|worker| bump(Arc::clone(&client), worker))).await;

    // THEN each batch saw its own increment reflected in its own read
    let mut seen: Vec<i64> = results
        .iter()
        .map(|replies| {
            let incr = replies[0].as_int().unwrap();
            assert_eq!(replies[2].as_int(), Some(incr));
            incr
        })
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (1..=16).collect::<Vec<i64>>());

    let keyspace = store.snapshot().await;
    assert_eq!(keyspace.get("counter"), Some(&Entry::Str("16".to_string())));
    match keyspace.get("log") {
        Some(Entry::List(list)) => assert_eq!(list.len(), 16),
        other => panic!("expected list, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_spawned_batches_are_isolated() {
    let store = Arc::new(MemoryStore::new());
    let client: Arc<dyn StoreClient> = store.clone();

    let handles: Vec<_> = (0..8)
        .map(|worker| tokio::spawn(bump(Arc::clone(&client), worker)))
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(
        store.snapshot().await.get("counter"),
        Some(&Entry::Str("8".to_string()))
    );
}
