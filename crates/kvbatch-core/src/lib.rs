//! kvbatch Core - atomic command batching for key-value stores
//!
//! This crate lets a caller accumulate an ordered sequence of store
//! operations and submit them as one transaction, with per-operation
//! callbacks and a final aggregate result:
//! - Command queue with positional identity and a one-way lifecycle
//! - Batch builder that stages any operation the backing client declares
//! - Executor replaying the queue into a single transaction handle
//! - Result dispatcher fanning replies back out in queue order
//! - Boundary traits for backing store clients
//! - Canonical error and logging facilities
//!
//! Either every staged operation takes effect and every callback fires with
//! its own reply, or the batch aborts and only the final callback sees the
//! error.

pub mod builder;
pub mod capabilities;
pub mod client;
pub mod dispatch;
pub mod errors;
pub mod executor;
pub mod logging_facility;
pub mod model;
pub mod queue;

// Re-export commonly used types
pub use builder::{BatchBuilder, PendingCallback};
pub use capabilities::OperationSet;
pub use client::{StoreClient, TransactionHandle};
pub use errors::{BatchError, ExError, ExErrorKind, Result, StoreError};
pub use model::{
    BatchOutcome, BatchState, FinalCallback, OperationCallback, OperationName, QueuedOperation,
    TransactionReply, Value, COMMIT_OPERATION,
};
pub use queue::CommandQueue;
