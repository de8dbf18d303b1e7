//! Boundary contract with the backing key-value store
//!
//! The batching layer never talks to a store directly. It consumes two
//! traits:
//!
//! - [`StoreClient`] declares which operations can be staged and opens
//!   transactions.
//! - [`TransactionHandle`] stages operations and commits them atomically.
//!
//! # Design
//!
//! `commit` is async because it performs network I/O against the store and
//! is the only suspension point of a batch. Staging is synchronous and only
//! records the operation; nothing takes effect before commit.
//!
//! A handle belongs to exactly one commit. Stores that support concurrent
//! independent transactions hand out a fresh handle per call to
//! [`StoreClient::begin_transaction`].

use async_trait::async_trait;

use crate::capabilities::OperationSet;
use crate::errors::StoreError;
use crate::model::{OperationName, Value};

/// A backing store client
pub trait StoreClient: Send + Sync {
    /// Operations this client can stage, declared once
    fn operations(&self) -> &OperationSet;

    /// Open a new transaction handle
    fn begin_transaction(&self) -> Box<dyn TransactionHandle>;
}

/// One open transaction against the backing store
#[async_trait]
pub trait TransactionHandle: Send {
    /// Record an operation for the next commit
    ///
    /// # Errors
    ///
    /// Clients may reject malformed arguments here with
    /// `StoreError::OperationArgument`. The batch then aborts without
    /// committing.
    fn stage(&mut self, name: &OperationName, args: Vec<Value>) -> Result<(), StoreError>;

    /// Apply every staged operation atomically
    ///
    /// Returns one reply per staged operation, in staging order.
    ///
    /// # Errors
    ///
    /// Any error means nothing was applied.
    async fn commit(&mut self) -> Result<Vec<Value>, StoreError>;
}
