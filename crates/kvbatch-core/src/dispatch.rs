//! Result dispatcher
//!
//! Delivers a batch outcome to the callbacks registered on it.
//!
//! - **Committed**: each per-operation callback receives the reply at its
//!   own position, in increasing position order; then the final callback
//!   receives the whole reply list.
//! - **Aborted**: per-operation callbacks are dropped without being called;
//!   only the final callback sees the error.
//!
//! Callers therefore observe either a full reply list with every callback
//! fired, or one error with none fired.

use crate::errors::Result;
use crate::model::{BatchOutcome, FinalCallback, TransactionReply};
use crate::queue::CommandQueue;

/// Deliver an outcome and move the queue to its terminal state
///
/// # Errors
///
/// Returns the abort error when the outcome is `Aborted`.
pub fn deliver(
    queue: &mut CommandQueue,
    outcome: BatchOutcome,
    final_callback: Option<FinalCallback>,
) -> Result<TransactionReply> {
    queue.finish(outcome.terminal_state());
    let callbacks = queue.take_callbacks();

    match outcome {
        BatchOutcome::Committed(replies) => {
            for (callback, reply) in callbacks.into_iter().zip(&replies) {
                if let Some(callback) = callback {
                    callback(reply);
                }
            }

            if let Some(final_callback) = final_callback {
                final_callback(Ok(&replies));
            }
            Ok(replies)
        }

        BatchOutcome::Aborted(err) => {
            drop(callbacks);

            if let Some(final_callback) = final_callback {
                final_callback(Err(&err));
            }
            Err(err)
        }
    }
}
