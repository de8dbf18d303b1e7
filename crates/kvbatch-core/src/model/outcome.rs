use crate::errors::BatchError;
use crate::model::TransactionReply;

/// Lifecycle state of one batch
///
/// `Building → Committing → {Committed | Aborted}`. Only `Building` accepts
/// appends; `Committing` is entered exactly once and no transition leaves a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Building,
    Committing,
    Committed,
    Aborted,
}

impl BatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchState::Committed | BatchState::Aborted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BatchState::Building => "building",
            BatchState::Committing => "committing",
            BatchState::Committed => "committed",
            BatchState::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for BatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of submitting a batch to the store
///
/// `Aborted` never carries partial replies: either every staged operation
/// took effect and has a reply, or none did.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Committed(TransactionReply),
    Aborted(BatchError),
}

impl BatchOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, BatchOutcome::Committed(_))
    }

    /// State the batch moves to once this outcome is delivered
    pub fn terminal_state(&self) -> BatchState {
        match self {
            BatchOutcome::Committed(_) => BatchState::Committed,
            BatchOutcome::Aborted(_) => BatchState::Aborted,
        }
    }

    pub fn into_result(self) -> Result<TransactionReply, BatchError> {
        match self {
            BatchOutcome::Committed(replies) => Ok(replies),
            BatchOutcome::Aborted(err) => Err(err),
        }
    }
}
