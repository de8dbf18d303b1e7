//! kvbatch Store - concrete backing clients for the batching engine
//!
//! Provides:
//! - `MemoryStore`: in-process keyspace with a Redis-like data model and
//!   all-or-nothing commits
//! - `RedisStore`: adapter staging operations into an atomic `MULTI`/`EXEC`
//!   pipeline over the `redis` crate
//! - Error helpers building `StoreError`s consistently across backends

pub mod errors;
pub mod memory;
pub mod redis_store;

// Re-export key types
pub use errors::Result;
pub use memory::{Entry, Keyspace, MemoryStore};
pub use redis_store::RedisStore;
