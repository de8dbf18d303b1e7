//! Batch Atomicity Tests
//!
//! A batch either commits with every callback fired, or aborts with only
//! the final callback seeing the error.
//!
//! ## Scenarios Covered
//!
//! 1. Commit failure: no per-operation callback, error reaches final callback and caller
//! 2. Store errors are surfaced unchanged
//! 3. Staging rejection aborts before commit is sent
//! 4. Reply count mismatch aborts the batch
//! 5. Aborted batch is terminal

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::{call_log, CommitBehavior, FakeClient};
use kvbatch_core::{BatchBuilder, BatchError, BatchState, StoreError, Value};

fn wrong_type() -> StoreError {
    StoreError::WrongType {
        op: "lpush".to_string(),
        key: "k1".to_string(),
    }
}

#[tokio::test]
async fn test_commit_failure_skips_operation_callbacks() {
    // GIVEN a store that aborts every transaction
    let client = FakeClient::failing(wrong_type());
    let log = call_log();
    let mut batch = BatchBuilder::new(client.clone());

    for name in ["set", "lpush", "get"] {
        let log = Arc::clone(&log);
        batch
            .call_with(name, ["k1"], move |reply: &Value| {
                log.lock().unwrap().push(format!("op:{}", reply));
            })
            .unwrap();
    }

    // WHEN the batch commits
    let final_log = Arc::clone(&log);
    let result = batch
        .commit_with(move |result| {
            let err = result.expect_err("batch should abort");
            final_log.lock().unwrap().push(format!("final:{}", err));
        })
        .await;

    // THEN only the final callback ran, with the store's error
    let expected = BatchError::Store(wrong_type());
    assert_eq!(result, Err(expected.clone()));
    assert_eq!(
        *log.lock().unwrap(),
        vec![format!("final:{}", expected)]
    );
    assert_eq!(batch.state(), BatchState::Aborted);
    assert_eq!(client.log().commits, 1);
}

#[tokio::test]
async fn test_store_error_is_not_rewritten() {
    let store_err = StoreError::Transaction {
        reason: "watched key modified".to_string(),
    };
    let client = FakeClient::failing(store_err.clone());
    let mut batch = BatchBuilder::new(client);
    batch.call("incr", ["counter"]).unwrap();

    let err = batch.commit().await.unwrap_err();

    assert!(err.is_transaction_error());
    assert_eq!(err, BatchError::Store(store_err.clone()));
    assert_eq!(err.to_string(), store_err.to_string());
}

#[tokio::test]
async fn test_staging_rejection_aborts_without_commit() {
    // GIVEN a store that rejects staging of "incr"
    let client = Arc::new(FakeClient::new(CommitBehavior::Echo).rejecting_stage("incr"));
    let log = call_log();
    let mut batch = BatchBuilder::new(client.clone());

    let cb_log = Arc::clone(&log);
    batch
        .call_with("set", ["k", "v"], move |_: &Value| {
            cb_log.lock().unwrap().push("set".to_string());
        })
        .unwrap()
        .call("incr", ["k"])
        .unwrap()
        .call("get", ["k"])
        .unwrap();

    // WHEN the batch commits
    let err = batch.commit().await.unwrap_err();

    // THEN the argument error surfaces, nothing after it was staged, and no commit was sent
    assert!(matches!(
        err,
        BatchError::Store(StoreError::OperationArgument { ref op, .. }) if op == "incr"
    ));
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(client.log().staged.len(), 1);
    assert_eq!(client.log().commits, 0);
    assert_eq!(batch.state(), BatchState::Aborted);
}

#[tokio::test]
async fn test_reply_count_mismatch_aborts() {
    // GIVEN a store that replies once for a two-operation batch
    let client = Arc::new(FakeClient::new(CommitBehavior::Replies(vec![Value::ok()])));
    let log = call_log();
    let mut batch = BatchBuilder::new(client);

    let cb_log = Arc::clone(&log);
    batch
        .call_with("set", ["k", "v"], move |_: &Value| {
            cb_log.lock().unwrap().push("set".to_string());
        })
        .unwrap()
        .call("get", ["k"])
        .unwrap();

    let err = batch.commit().await.unwrap_err();

    assert_eq!(
        err,
        BatchError::ReplyCountMismatch {
            expected: 2,
            actual: 1
        }
    );
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_aborted_batch_cannot_be_retried() {
    let client = FakeClient::failing(StoreError::Unavailable {
        reason: "connection reset".to_string(),
    });
    let mut batch = BatchBuilder::new(client.clone());
    batch.call("set", ["k", "v"]).unwrap();

    assert!(batch.commit().await.is_err());

    // Retrying means building a fresh batch
    let err = batch.commit().await.unwrap_err();
    assert!(matches!(
        err,
        BatchError::AlreadyCommitted {
            state: BatchState::Aborted,
            ..
        }
    ));
    assert_eq!(client.log().transactions_opened, 1);
}
