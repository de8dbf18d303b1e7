//! Batch executor
//!
//! Drives one commit: opens a transaction handle, replays the queue into it
//! in order, and requests commit.
//!
//! ## Executor Contract
//!
//! 1. Refuse a queue that is not building (`AlreadyCommitted`)
//! 2. Open exactly one transaction handle for the commit
//! 3. Stage every queued operation in queue order; staging applies nothing
//! 4. Request commit, the single suspension point
//! 5. Return `Committed` only if the store replied once per staged operation
//!
//! A staging rejection aborts the batch before commit is requested. Store
//! errors are carried into `Aborted` unchanged.

use std::time::Instant;

use kvbatch_core_types::schema::{OP_BATCH_COMMIT, OP_BATCH_STAGE};
use kvbatch_core_types::RequestContext;

use crate::client::{StoreClient, TransactionHandle};
use crate::errors::{BatchError, Result};
use crate::model::BatchOutcome;
use crate::queue::CommandQueue;
use crate::{log_op_end, log_op_error, log_op_start};

/// Submits command queues to a store client
pub struct Executor<'a> {
    client: &'a dyn StoreClient,
    context: Option<&'a RequestContext>,
}

impl<'a> Executor<'a> {
    pub fn new(client: &'a dyn StoreClient) -> Self {
        Self {
            client,
            context: None,
        }
    }

    /// Attach caller correlation to the log events of this commit
    pub fn with_context(mut self, context: Option<&'a RequestContext>) -> Self {
        self.context = context;
        self
    }

    /// Commit the queue as one transaction
    ///
    /// On return the queue is in the committing state; the result dispatcher
    /// moves it to its terminal state when the outcome is delivered.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCommitted` if the queue already left the building
    /// state. Store failures are not errors here; they come back as
    /// `BatchOutcome::Aborted`.
    pub async fn execute(&self, queue: &mut CommandQueue) -> Result<BatchOutcome> {
        queue.begin_commit()?;

        let start = Instant::now();
        let batch_id = queue.batch_id().to_string();
        let (request_id, trace_id) = self.correlation();

        log_op_start!(
            OP_BATCH_COMMIT,
            batch_id = %batch_id,
            batch_len = queue.len(),
            request_id = request_id,
            trace_id = trace_id,
        );

        let outcome = self.submit(queue).await;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &outcome {
            BatchOutcome::Committed(replies) => {
                log_op_end!(
                    OP_BATCH_COMMIT,
                    duration_ms = duration_ms,
                    batch_id = %batch_id,
                    reply_len = replies.len(),
                    request_id = request_id,
                    trace_id = trace_id,
                );
            }
            BatchOutcome::Aborted(err) => {
                log_op_error!(
                    OP_BATCH_COMMIT,
                    err,
                    duration_ms = duration_ms,
                    batch_id = %batch_id,
                    position = queue.rejected_position(),
                    request_id = request_id,
                    trace_id = trace_id,
                    error = %err,
                );
            }
        }

        Ok(outcome)
    }

    fn correlation(&self) -> (Option<&'a str>, Option<&'a str>) {
        let request_id = self.context.map(|ctx| ctx.request_id.as_str());
        let trace_id = self
            .context
            .and_then(|ctx| ctx.trace_id.as_ref())
            .map(|id| id.as_str());
        (request_id, trace_id)
    }

    async fn submit(&self, queue: &mut CommandQueue) -> BatchOutcome {
        let expected = queue.len();
        let mut tx = self.client.begin_transaction();

        if let Err((position, err)) = self.stage_all(tx.as_mut(), queue) {
            queue.mark_rejected(position);
            return BatchOutcome::Aborted(err);
        }

        match tx.commit().await {
            Ok(replies) if replies.len() == expected => BatchOutcome::Committed(replies),
            Ok(replies) => BatchOutcome::Aborted(BatchError::ReplyCountMismatch {
                expected,
                actual: replies.len(),
            }),
            Err(err) => BatchOutcome::Aborted(err.into()),
        }
    }

    /// Stage every operation; on rejection, the refused position and its error
    fn stage_all(
        &self,
        tx: &mut dyn TransactionHandle,
        queue: &CommandQueue,
    ) -> std::result::Result<(), (usize, BatchError)> {
        let (request_id, trace_id) = self.correlation();

        for (position, op) in queue.iter().enumerate() {
            tracing::debug!(
                component = module_path!(),
                op = OP_BATCH_STAGE,
                batch_id = %queue.batch_id(),
                position,
                operation = op.name().as_str(),
                request_id = request_id,
                trace_id = trace_id,
            );

            if let Err(err) = tx.stage(op.name(), op.args().to_vec()) {
                tracing::warn!(
                    component = module_path!(),
                    op = OP_BATCH_STAGE,
                    batch_id = %queue.batch_id(),
                    position,
                    operation = op.name().as_str(),
                    request_id = request_id,
                    trace_id = trace_id,
                    error = %err,
                    "staging rejected, batch not submitted"
                );
                return Err((position, err.into()));
            }
        }
        Ok(())
    }
}
