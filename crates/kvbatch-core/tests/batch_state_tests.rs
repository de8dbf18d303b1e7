//! Batch State Tests
//!
//! Lifecycle and caller-error handling of the batch builder.
//!
//! ## Scenarios Covered
//!
//! 1. Double commit fails with a state error
//! 2. Append after commit fails with a state error
//! 3. Unknown operations are rejected without appending
//! 4. The reserved commit name cannot be staged
//! 5. Callbacks attach to the operation call that follows them
//! 6. Concurrent batches never share a transaction

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::{call_log, FakeClient};
use kvbatch_core::{BatchBuilder, BatchError, BatchState, Value};
use kvbatch_core_types::RequestContext;

#[tokio::test]
async fn test_double_commit_fails_with_state_error() {
    let client = FakeClient::echo();
    let log = call_log();
    let mut batch = BatchBuilder::new(client.clone());
    batch.call("set", ["k", "v"]).unwrap();

    batch.commit().await.unwrap();

    // Second commit is rejected locally and never reaches the store
    let final_log = Arc::clone(&log);
    let err = batch
        .commit_with(move |_| final_log.lock().unwrap().push("final".to_string()))
        .await
        .unwrap_err();

    assert!(err.is_state_error());
    assert!(matches!(
        err,
        BatchError::AlreadyCommitted {
            state: BatchState::Committed,
            ..
        }
    ));
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(client.log().transactions_opened, 1);
    assert_eq!(client.log().commits, 1);
}

#[tokio::test]
async fn test_append_after_commit_fails() {
    let client = FakeClient::echo();
    let mut batch = BatchBuilder::new(client);
    batch.call("set", ["k", "v"]).unwrap();
    batch.commit().await.unwrap();

    let err = batch.call("get", ["k"]).unwrap_err();

    assert!(matches!(err, BatchError::AlreadyCommitted { .. }));
    assert_eq!(batch.len(), 1);
}

#[test]
fn test_unknown_operation_is_rejected() {
    let client = FakeClient::echo();
    let mut batch = BatchBuilder::new(client);
    batch.call("set", ["k", "v"]).unwrap();

    let err = batch.call("flushall", Vec::<Value>::new()).unwrap_err();

    assert_eq!(
        err,
        BatchError::UnknownOperation {
            name: "flushall".to_string()
        }
    );
    assert!(err.is_state_error());
    assert_eq!(batch.len(), 1);
}

#[test]
fn test_commit_cannot_be_staged() {
    let client = FakeClient::echo();
    let mut batch = BatchBuilder::new(client);

    let err = batch.call("COMMIT", Vec::<Value>::new()).unwrap_err();

    assert!(matches!(err, BatchError::ReservedOperation { .. }));
    assert!(batch.is_empty());
    assert_eq!(batch.state(), BatchState::Building);
}

#[test]
fn test_operation_names_are_case_insensitive() {
    let client = FakeClient::echo();
    let mut batch = BatchBuilder::new(client);

    batch.call("SET", ["k", "v"]).unwrap().call("Get", ["k"]).unwrap();

    assert_eq!(batch.names(), vec!["set", "get"]);
}

#[tokio::test]
async fn test_with_callback_attaches_to_next_call_only() {
    let client = FakeClient::echo();
    let log = call_log();
    let mut batch = BatchBuilder::new(client);

    let cb_log = Arc::clone(&log);
    batch
        .with_callback(move |reply: &Value| cb_log.lock().unwrap().push(reply.to_string()))
        .call("set", ["k", "v"])
        .unwrap()
        .call("get", ["k"])
        .unwrap();

    assert!(batch.queue().get(0).unwrap().has_callback());
    assert!(!batch.queue().get(1).unwrap().has_callback());

    batch.commit().await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["\"0:set\""]);
}

#[test]
fn test_with_callback_on_rejected_call_drops_callback() {
    let client = FakeClient::echo();
    let mut batch = BatchBuilder::new(client);

    let result = batch
        .with_callback(|_: &Value| panic!("must never run"))
        .call("nope", ["k"]);

    assert!(result.is_err());
    assert!(batch.is_empty());
}

#[tokio::test]
async fn test_batches_have_distinct_ids() {
    let client = FakeClient::echo();
    let a = BatchBuilder::new(client.clone());
    let b = BatchBuilder::new(client).with_context(RequestContext::new());

    assert_ne!(a.batch_id(), b.batch_id());
}

#[tokio::test]
async fn test_concurrent_batches_open_own_transactions() {
    // GIVEN four independent batches over one client
    let client = FakeClient::echo();
    let mut batches: Vec<BatchBuilder> = (0..4)
        .map(|_| BatchBuilder::new(client.clone()))
        .collect();
    for batch in &mut batches {
        batch.call("incr", ["counter"]).unwrap();
    }

    // WHEN they commit concurrently
    let results = futures::future::join_all(batches.iter_mut().map(|b| b.commit())).await;

    // THEN each batch got its own transaction and its own single reply
    assert!(results.iter().all(|r| r.as_ref().map(Vec::len) == Ok(1)));
    assert_eq!(client.log().transactions_opened, 4);
    assert_eq!(client.log().commits, 4);
    assert!(batches.iter().all(|b| b.state() == BatchState::Committed));
}
