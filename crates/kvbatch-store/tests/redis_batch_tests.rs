//! Redis adapter against a live server
//!
//! Runs only when `KVBATCH_TEST_REDIS_URL` points at a disposable Redis
//! instance; otherwise each test returns early.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use kvbatch_core::{BatchBuilder, BatchError, StoreError, Value};
use kvbatch_store::RedisStore;

async fn connect() -> Option<RedisStore> {
    let url = std::env::var("KVBATCH_TEST_REDIS_URL").ok()?;
    Some(RedisStore::connect(&url).await.expect("redis should be reachable"))
}

#[tokio::test]
async fn test_set_then_get_round_trip() {
    let Some(store) = connect().await else {
        return;
    };
    let key = format!("kvbatch:test:{}", kvbatch_core_types::BatchId::new());

    let mut batch = BatchBuilder::new(Arc::new(store));
    batch
        .call("set", [key.as_str(), "v1"])
        .unwrap()
        .call("get", [key.as_str()])
        .unwrap()
        .call("del", [key.as_str()])
        .unwrap();

    let replies = batch.commit().await.unwrap();

    assert_eq!(replies, vec![Value::ok(), Value::from("v1"), Value::Int(1)]);
}

#[tokio::test]
async fn test_wrong_type_reports_transaction_error() {
    let Some(store) = connect().await else {
        return;
    };
    let key = format!("kvbatch:test:{}", kvbatch_core_types::BatchId::new());

    let mut batch = BatchBuilder::new(Arc::new(store));
    batch
        .call("set", [key.as_str(), "v1"])
        .unwrap()
        .call("lpush", [key.as_str(), "a"])
        .unwrap();

    let err = batch.commit().await.unwrap_err();

    assert!(matches!(err, BatchError::Store(StoreError::Transaction { .. })));
}

#[tokio::test]
async fn test_empty_batch_pings_the_server() {
    let Some(store) = connect().await else {
        return;
    };
    let store = Arc::new(store);

    let mut batch = BatchBuilder::new(store.clone());
    let replies = batch.commit().await.unwrap();

    assert!(replies.is_empty());
    assert_eq!(batch.state(), kvbatch_core::BatchState::Committed);
}

#[tokio::test]
async fn test_unreachable_server_is_unavailable() {
    let err = RedisStore::connect("redis://127.0.0.1:1/").await.err();
    assert!(matches!(err, Some(StoreError::Unavailable { .. })));
}
