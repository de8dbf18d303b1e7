use std::borrow::Borrow;

use crate::errors::{BatchError, Result};
use crate::model::Value;

/// Name of the operation that submits a batch; it can never be staged
pub const COMMIT_OPERATION: &str = "commit";

/// Callback fired with the reply of one staged operation
pub type OperationCallback = Box<dyn FnOnce(&Value) + Send>;

/// Callback fired once with the outcome of the whole batch
///
/// The error-first convention rendered as a `Result`: `Ok` carries the full
/// reply list, `Err` the error that aborted the batch.
pub type FinalCallback = Box<dyn FnOnce(std::result::Result<&[Value], &BatchError>) + Send>;

/// Ordered replies of a committed batch, aligned with queue positions
pub type TransactionReply = Vec<Value>;

/// Validated operation identifier
///
/// Names are case-insensitive and normalised to lower case. The reserved
/// commit name is rejected at construction, so a value of this type can
/// always be staged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationName(String);

impl OperationName {
    /// Validate and normalise an operation name
    ///
    /// # Errors
    ///
    /// * `InvalidOperationName` - if the name is empty or contains whitespace
    /// * `ReservedOperation` - if the name is the commit operation
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let raw = name.as_ref();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(BatchError::InvalidOperationName {
                name: raw.to_string(),
                reason: "name cannot be empty".to_string(),
            });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(BatchError::InvalidOperationName {
                name: raw.to_string(),
                reason: "name cannot contain whitespace".to_string(),
            });
        }

        let normalised = trimmed.to_ascii_lowercase();
        if normalised == COMMIT_OPERATION {
            return Err(BatchError::ReservedOperation { name: normalised });
        }

        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for OperationName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OperationName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One pending operation in a command queue
///
/// Immutable once appended; its identity is its position in the queue. The
/// callback is released exactly once, when the batch commits.
pub struct QueuedOperation {
    name: OperationName,
    args: Vec<Value>,
    on_result: Option<OperationCallback>,
}

impl QueuedOperation {
    pub(crate) fn new(
        name: OperationName,
        args: Vec<Value>,
        on_result: Option<OperationCallback>,
    ) -> Self {
        Self {
            name,
            args,
            on_result,
        }
    }

    pub fn name(&self) -> &OperationName {
        &self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn has_callback(&self) -> bool {
        self.on_result.is_some()
    }

    pub(crate) fn take_callback(&mut self) -> Option<OperationCallback> {
        self.on_result.take()
    }
}

impl std::fmt::Debug for QueuedOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedOperation")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("has_callback", &self.has_callback())
            .finish()
    }
}
