pub mod operation;
pub mod outcome;
pub mod value;

pub use operation::{
    FinalCallback, OperationCallback, OperationName, QueuedOperation, TransactionReply,
    COMMIT_OPERATION,
};
pub use outcome::{BatchOutcome, BatchState};
pub use value::Value;
