//! Correlation ids for batches and caller requests
//!
//! A batch is identified by a [`BatchId`] from the moment its builder is
//! created. Callers may add a [`RequestContext`] so that the batch's log
//! events and canonical errors can be joined with their own request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Time-ordered string id over a UUIDv7
macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

correlation_id! {
    /// One command batch; every log event of its commit carries it
    BatchId
}

correlation_id! {
    /// One caller request, which may build several batches
    RequestId
}

correlation_id! {
    /// Trace spanning service boundaries
    TraceId
}

impl BatchId {
    /// Rebuild an id that was rendered into an error
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

/// Caller correlation attached to a batch
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
}

impl RequestContext {
    /// Fresh request id, no trace
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}
