//! In-memory backing client
//!
//! `MemoryStore` keeps a Redis-like keyspace behind an async mutex. Each
//! transaction parses its operations at staging time and applies them at
//! commit to a working copy that replaces the keyspace only if every
//! operation succeeded, so a failed commit leaves no partial writes.
//!
//! Commits on one store are serialized by the mutex; concurrent batches
//! never observe each other's intermediate state.

mod apply;
mod command;
mod keyspace;

use std::sync::Arc;

use async_trait::async_trait;
use kvbatch_core::{OperationName, OperationSet, StoreClient, StoreError, TransactionHandle, Value};
use tokio::sync::Mutex;

pub use command::OPERATIONS;
pub use keyspace::{Entry, Keyspace};

use command::Command;

/// Shared in-memory store
///
/// Cloning yields another handle onto the same keyspace.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    keyspace: Arc<Mutex<Keyspace>>,
    operations: OperationSet,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_keyspace(Keyspace::new())
    }

    /// Start from an existing keyspace
    pub fn with_keyspace(keyspace: Keyspace) -> Self {
        Self {
            keyspace: Arc::new(Mutex::new(keyspace)),
            operations: OperationSet::from_names(OPERATIONS)
                .expect("OPERATIONS holds valid, unreserved names"),
        }
    }

    /// Copy of the current keyspace
    pub async fn snapshot(&self) -> Keyspace {
        self.keyspace.lock().await.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreClient for MemoryStore {
    fn operations(&self) -> &OperationSet {
        &self.operations
    }

    fn begin_transaction(&self) -> Box<dyn TransactionHandle> {
        Box::new(MemoryTransaction {
            keyspace: Arc::clone(&self.keyspace),
            staged: Vec::new(),
        })
    }
}

/// One transaction against a [`MemoryStore`]
struct MemoryTransaction {
    keyspace: Arc<Mutex<Keyspace>>,
    staged: Vec<(OperationName, Command)>,
}

#[async_trait]
impl TransactionHandle for MemoryTransaction {
    fn stage(&mut self, name: &OperationName, args: Vec<Value>) -> Result<(), StoreError> {
        let command = Command::parse(name, args)?;
        self.staged.push((name.clone(), command));
        Ok(())
    }

    async fn commit(&mut self) -> Result<Vec<Value>, StoreError> {
        let staged = std::mem::take(&mut self.staged);
        let mut keyspace = self.keyspace.lock().await;

        let (next, replies) = apply::apply_all(keyspace.clone(), &staged)?;
        *keyspace = next;

        tracing::debug!(
            component = module_path!(),
            op = "memory_commit",
            applied = replies.len(),
            keys = keyspace.len(),
        );
        Ok(replies)
    }
}
