//! Redis backing client
//!
//! Stages operations into an atomic pipeline (`MULTI` ... `EXEC`) and sends
//! it in one round trip at commit. The wire protocol is the `redis` crate's.
//!
//! Redis queues commands and rejects the whole transaction on syntax errors,
//! but a command that fails at `EXEC` time (e.g. `WRONGTYPE`) does not roll
//! back the commands before it. The batch is still reported as aborted with
//! the server's error.
//!
//! An empty batch sends a `PING` instead of an empty `MULTI`/`EXEC`, so it
//! still fails when the server is unreachable.

use async_trait::async_trait;
use kvbatch_core::{OperationName, OperationSet, StoreClient, StoreError, TransactionHandle, Value};
use redis::aio::MultiplexedConnection;

use crate::errors::{self, Result};

/// Commands declared by default
pub const REDIS_OPERATIONS: &[&str] = &[
    "del", "exists", "expire", "persist", "ttl", "type", "set", "setnx", "get", "getset",
    "append", "strlen", "incr", "decr", "incrby", "decrby", "mset", "mget", "lpush", "rpush",
    "lpop", "rpop", "lrange", "llen", "lindex", "lrem", "ltrim", "hset", "hget", "hdel",
    "hgetall", "hexists", "hincrby", "hkeys", "hvals", "hlen", "sadd", "srem", "smembers",
    "sismember", "scard", "zadd", "zrem", "zrange", "zscore", "zcard", "zincrby",
];

/// Client over a multiplexed Redis connection
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
    operations: OperationSet,
}

impl RedisStore {
    /// Connect to the server at `url` (e.g. `redis://127.0.0.1/`)
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the URL is invalid or the server cannot be reached.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(errors::from_redis)?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(errors::from_redis)?;

        tracing::info!(component = module_path!(), op = "redis_connect", "connected");
        Ok(Self::with_connection(connection))
    }

    /// Wrap an existing connection, declaring [`REDIS_OPERATIONS`]
    pub fn with_connection(connection: MultiplexedConnection) -> Self {
        Self {
            connection,
            operations: OperationSet::from_names(REDIS_OPERATIONS)
                .expect("REDIS_OPERATIONS holds valid, unreserved names"),
        }
    }

    /// Declare an additional command
    ///
    /// # Errors
    ///
    /// Fails if the name is invalid or reserved.
    pub fn with_operation(mut self, name: &str) -> kvbatch_core::Result<Self> {
        self.operations.insert(OperationName::new(name)?);
        Ok(self)
    }
}

impl StoreClient for RedisStore {
    fn operations(&self) -> &OperationSet {
        &self.operations
    }

    fn begin_transaction(&self) -> Box<dyn TransactionHandle> {
        Box::new(RedisTransaction::new(self.connection.clone()))
    }
}

struct RedisTransaction {
    connection: MultiplexedConnection,
    pipeline: redis::Pipeline,
    staged: usize,
}

impl RedisTransaction {
    fn new(connection: MultiplexedConnection) -> Self {
        let mut pipeline = redis::pipe();
        pipeline.atomic();
        Self {
            connection,
            pipeline,
            staged: 0,
        }
    }
}

#[async_trait]
impl TransactionHandle for RedisTransaction {
    fn stage(
        &mut self,
        name: &OperationName,
        args: Vec<Value>,
    ) -> std::result::Result<(), StoreError> {
        self.pipeline.add_command(build_command(name, &args)?);
        self.staged += 1;
        Ok(())
    }

    async fn commit(&mut self) -> std::result::Result<Vec<Value>, StoreError> {
        if self.staged == 0 {
            redis::cmd("PING")
                .query_async::<_, ()>(&mut self.connection)
                .await
                .map_err(errors::from_redis)?;
            return Ok(Vec::new());
        }

        let replies: Vec<redis::Value> = self
            .pipeline
            .query_async(&mut self.connection)
            .await
            .map_err(errors::from_redis)?;

        Ok(replies.into_iter().map(from_redis_value).collect())
    }
}

/// Build one command; arrays are flattened into successive arguments
fn build_command(name: &OperationName, args: &[Value]) -> Result<redis::Cmd> {
    let mut cmd = redis::cmd(name.as_str());
    for (position, arg) in args.iter().enumerate() {
        push_arg(&mut cmd, name.as_str(), position, arg)?;
    }
    Ok(cmd)
}

fn push_arg(cmd: &mut redis::Cmd, op: &str, position: usize, value: &Value) -> Result<()> {
    match value {
        Value::Int(i) => {
            cmd.arg(*i);
        }
        Value::Bulk(s) | Value::Status(s) => {
            cmd.arg(s.as_str());
        }
        Value::Array(items) => {
            for item in items {
                push_arg(cmd, op, position, item)?;
            }
        }
        Value::Nil => return Err(errors::not_scalar(op, position)),
    }
    Ok(())
}

/// Convert a Redis reply into a batch value
pub(crate) fn from_redis_value(value: redis::Value) -> Value {
    match value {
        redis::Value::Nil => Value::Nil,
        redis::Value::Int(i) => Value::Int(i),
        redis::Value::Data(bytes) => Value::Bulk(String::from_utf8_lossy(&bytes).into_owned()),
        redis::Value::Bulk(items) => {
            Value::Array(items.into_iter().map(from_redis_value).collect())
        }
        redis::Value::Status(status) => Value::Status(status),
        redis::Value::Okay => Value::ok(),
    }
}
