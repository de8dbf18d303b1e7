//! Core types shared across kvbatch facilities
//!
//! This crate provides foundational types used by the error, logging and
//! batching layers:
//!
//! - **Correlation types**: BatchId, RequestId, TraceId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{BatchId, RequestContext, RequestId, TraceId};
