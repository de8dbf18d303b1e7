use kvbatch_core_types::{BatchId, RequestId, TraceId};
use thiserror::Error;

use crate::model::BatchState;

/// Result type alias using BatchError
pub type Result<T> = std::result::Result<T, BatchError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// raised while building and committing batches. Each kind maps to a stable
/// error code that can be used for programmatic handling, log assertions and
/// CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Caller/State
    InvalidInput,
    ReservedOperation,
    UnknownOperation,
    AlreadyCommitted,

    // Store outcomes
    OperationArgument,
    WrongType,
    TransactionAborted,
    ReplyMismatch,
    StoreUnavailable,

    // Integration/IO
    Io,
    Serialization,
    Config,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::ReservedOperation => "ERR_RESERVED_OPERATION",
            ExErrorKind::UnknownOperation => "ERR_UNKNOWN_OPERATION",
            ExErrorKind::AlreadyCommitted => "ERR_ALREADY_COMMITTED",
            ExErrorKind::OperationArgument => "ERR_OPERATION_ARGUMENT",
            ExErrorKind::WrongType => "ERR_WRONG_TYPE",
            ExErrorKind::TransactionAborted => "ERR_TRANSACTION_ABORTED",
            ExErrorKind::ReplyMismatch => "ERR_REPLY_MISMATCH",
            ExErrorKind::StoreUnavailable => "ERR_STORE_UNAVAILABLE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
        }
    }
}

/// Canonical structured error type
///
/// This error type provides a structured representation of errors with
/// classification fields for programmatic handling and rich context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    batch_id: Option<BatchId>,
    position: Option<usize>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            batch_id: None,
            position: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add batch context
    pub fn with_batch_id(mut self, batch_id: BatchId) -> Self {
        self.batch_id = Some(batch_id);
        self
    }

    /// Add queue position context
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the batch context, if any
    pub fn batch_id(&self) -> Option<&BatchId> {
        self.batch_id.as_ref()
    }

    /// Get the queue position context, if any
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the trace ID context, if any
    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(batch_id) = &self.batch_id {
            write!(f, " (batch_id: {})", batch_id)?;
        }
        if let Some(position) = self.position {
            write!(f, " (position: {})", position)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Errors reported by a backing store client
///
/// Store clients return these from staging and commit. The batching layer
/// never rewrites them; they reach the caller wrapped in [`BatchError::Store`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Arguments do not fit the operation (arity, integer parsing, ...)
    #[error("ERR wrong arguments for '{op}': {reason}")]
    OperationArgument { op: String, reason: String },

    /// Operation applied to a key holding an incompatible value
    #[error("WRONGTYPE operation '{op}' against key '{key}' holding the wrong kind of value")]
    WrongType { op: String, key: String },

    /// The store rejected or aborted the transaction as a whole
    #[error("EXECABORT transaction aborted: {reason}")]
    Transaction { reason: String },

    /// The store could not be reached or the connection dropped
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Errors surfaced by batch building and commit
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    // ===== State Errors =====
    /// The batch left the building state; it cannot be appended to or committed again
    #[error("batch {batch_id} is no longer building (state: {state})")]
    AlreadyCommitted { batch_id: String, state: BatchState },

    /// The reserved commit name was used as a staged operation
    #[error("'{name}' is reserved; call commit() to submit the batch")]
    ReservedOperation { name: String },

    /// The backing client does not declare this operation
    #[error("unknown operation '{name}'")]
    UnknownOperation { name: String },

    /// Operation names must be non-empty and free of whitespace
    #[error("invalid operation name '{name}': {reason}")]
    InvalidOperationName { name: String, reason: String },

    // ===== Transaction Errors =====
    /// Error returned by the backing store during staging or commit
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store replied with a list that does not line up with the staged operations
    #[error("store returned {actual} replies for {expected} staged operations")]
    ReplyCountMismatch { expected: usize, actual: usize },
}

impl BatchError {
    /// Local precondition violations, reported before anything reaches the store
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            BatchError::AlreadyCommitted { .. }
                | BatchError::ReservedOperation { .. }
                | BatchError::UnknownOperation { .. }
                | BatchError::InvalidOperationName { .. }
        )
    }

    /// Outcomes that abort a batch after commit was requested
    pub fn is_transaction_error(&self) -> bool {
        matches!(
            self,
            BatchError::Store(_) | BatchError::ReplyCountMismatch { .. }
        )
    }
}

impl From<StoreError> for ExError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OperationArgument { op, reason } => {
                ExError::new(ExErrorKind::OperationArgument)
                    .with_op(op)
                    .with_message(reason)
            }

            StoreError::WrongType { op, key } => ExError::new(ExErrorKind::WrongType)
                .with_op(op)
                .with_message(format!("Key '{}' holds the wrong kind of value", key)),

            StoreError::Transaction { reason } => {
                ExError::new(ExErrorKind::TransactionAborted).with_message(reason)
            }

            StoreError::Unavailable { reason } => {
                ExError::new(ExErrorKind::StoreUnavailable).with_message(reason)
            }
        }
    }
}

/// Conversion from BatchError to the canonical ExError
impl From<BatchError> for ExError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::AlreadyCommitted { batch_id, state } => {
                ExError::new(ExErrorKind::AlreadyCommitted)
                    .with_batch_id(BatchId::from_string(batch_id))
                    .with_message(format!("Batch is {}", state))
            }

            BatchError::ReservedOperation { name } => {
                ExError::new(ExErrorKind::ReservedOperation)
                    .with_op(name)
                    .with_message("Reserved name cannot be staged")
            }

            BatchError::UnknownOperation { name } => ExError::new(ExErrorKind::UnknownOperation)
                .with_op(name)
                .with_message("Operation is not supported by the backing client"),

            BatchError::InvalidOperationName { name, reason } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op(name)
                    .with_message(reason)
            }

            BatchError::Store(store_err) => store_err.into(),

            BatchError::ReplyCountMismatch { expected, actual } => {
                ExError::new(ExErrorKind::ReplyMismatch).with_message(format!(
                    "Expected {} replies, store returned {}",
                    expected, actual
                ))
            }
        }
    }
}

impl From<&BatchError> for ExError {
    fn from(err: &BatchError) -> Self {
        err.clone().into()
    }
}
