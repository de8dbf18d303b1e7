//! Command queue
//!
//! The ordered, append-only list of pending operations that makes up one
//! batch. Positions are assigned at append time and never change; the queue
//! tracks the batch lifecycle and refuses appends once commit has begun.

use kvbatch_core_types::BatchId;

use crate::errors::{BatchError, Result};
use crate::model::{BatchState, OperationCallback, OperationName, QueuedOperation, Value};

/// Ordered queue of operations owned by one batch
#[derive(Debug)]
pub struct CommandQueue {
    batch_id: BatchId,
    ops: Vec<QueuedOperation>,
    state: BatchState,
    rejected_at: Option<usize>,
}

impl CommandQueue {
    /// Create an empty queue in the building state
    pub fn new(batch_id: BatchId) -> Self {
        Self {
            batch_id,
            ops: Vec::new(),
            state: BatchState::Building,
            rejected_at: None,
        }
    }

    /// Append an operation and return its zero-based position
    ///
    /// Arguments are kept verbatim; validating them is the store's job.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCommitted` unless the queue is still building.
    pub fn append(
        &mut self,
        name: OperationName,
        args: Vec<Value>,
        on_result: Option<OperationCallback>,
    ) -> Result<usize> {
        self.ensure_building()?;

        let position = self.ops.len();
        self.ops.push(QueuedOperation::new(name, args, on_result));
        Ok(position)
    }

    pub fn batch_id(&self) -> &BatchId {
        &self.batch_id
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Operation at a position, if any
    pub fn get(&self, position: usize) -> Option<&QueuedOperation> {
        self.ops.get(position)
    }

    /// Operations in queue order
    pub fn iter(&self) -> impl Iterator<Item = &QueuedOperation> {
        self.ops.iter()
    }

    /// `(position, name, args)` triples in queue order
    pub fn operations(&self) -> impl Iterator<Item = (usize, &str, &[Value])> {
        self.ops
            .iter()
            .enumerate()
            .map(|(position, op)| (position, op.name().as_str(), op.args()))
    }

    /// Operation names in queue order
    pub fn names(&self) -> Vec<&str> {
        self.ops.iter().map(|op| op.name().as_str()).collect()
    }

    /// Position the store refused while staging, if the batch aborted there
    pub fn rejected_position(&self) -> Option<usize> {
        self.rejected_at
    }

    pub(crate) fn mark_rejected(&mut self, position: usize) {
        self.rejected_at = Some(position);
    }

    /// Move from building to committing
    ///
    /// Succeeds exactly once per queue.
    pub(crate) fn begin_commit(&mut self) -> Result<()> {
        self.ensure_building()?;
        self.state = BatchState::Committing;
        Ok(())
    }

    /// Move from committing to a terminal state
    pub(crate) fn finish(&mut self, state: BatchState) {
        debug_assert_eq!(self.state, BatchState::Committing);
        debug_assert!(state.is_terminal());
        self.state = state;
    }

    /// Release every per-operation callback in queue order
    pub(crate) fn take_callbacks(&mut self) -> Vec<Option<OperationCallback>> {
        self.ops
            .iter_mut()
            .map(QueuedOperation::take_callback)
            .collect()
    }

    fn ensure_building(&self) -> Result<()> {
        if self.state != BatchState::Building {
            return Err(BatchError::AlreadyCommitted {
                batch_id: self.batch_id.to_string(),
                state: self.state,
            });
        }
        Ok(())
    }
}
