//! Batch builder
//!
//! Chainable façade over a command queue. Any operation the backing client
//! declares in its [`OperationSet`](crate::capabilities::OperationSet) can be
//! staged by name; the builder itself knows no operation names.
//!
//! ## Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use kvbatch_core::{BatchBuilder, Value};
//! # use kvbatch_core::{OperationSet, OperationName, StoreClient, StoreError, TransactionHandle};
//! # struct Echo(OperationSet);
//! # struct EchoTx(Vec<Value>);
//! # #[async_trait::async_trait]
//! # impl TransactionHandle for EchoTx {
//! #     fn stage(&mut self, _: &OperationName, args: Vec<Value>) -> Result<(), StoreError> {
//! #         self.0.push(args.into_iter().next().unwrap_or(Value::Nil));
//! #         Ok(())
//! #     }
//! #     async fn commit(&mut self) -> Result<Vec<Value>, StoreError> {
//! #         Ok(std::mem::take(&mut self.0))
//! #     }
//! # }
//! # impl StoreClient for Echo {
//! #     fn operations(&self) -> &OperationSet { &self.0 }
//! #     fn begin_transaction(&self) -> Box<dyn TransactionHandle> { Box::new(EchoTx(Vec::new())) }
//! # }
//! # let client = Arc::new(Echo(OperationSet::from_names(["echo"]).unwrap()));
//! # tokio_test::block_on(async {
//! let seen = Arc::new(Mutex::new(None));
//! let sink = Arc::clone(&seen);
//!
//! let mut batch = BatchBuilder::new(client);
//! batch
//!     .call("echo", ["a"])?
//!     .with_callback(move |reply: &Value| *sink.lock().unwrap() = Some(reply.clone()))
//!     .call("echo", ["b"])?;
//!
//! let replies = batch.commit().await?;
//! assert_eq!(replies, vec![Value::from("a"), Value::from("b")]);
//! assert_eq!(*seen.lock().unwrap(), Some(Value::from("b")));
//! # Ok::<(), kvbatch_core::BatchError>(())
//! # }).unwrap();
//! ```

use std::sync::Arc;

use kvbatch_core_types::{BatchId, RequestContext};

use crate::client::StoreClient;
use crate::dispatch;
use crate::errors::{BatchError, ExError, Result};
use crate::executor::Executor;
use crate::model::{BatchState, FinalCallback, OperationCallback, TransactionReply, Value};
use crate::queue::CommandQueue;

/// Builds one batch of operations and commits it atomically
///
/// Appends take `&mut self`, so a batch has a single owner and appends are
/// sequenced by the borrow checker. A builder commits at most once.
pub struct BatchBuilder {
    client: Arc<dyn StoreClient>,
    queue: CommandQueue,
    context: Option<RequestContext>,
}

impl BatchBuilder {
    /// Start a new batch against a store client
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        Self {
            client,
            queue: CommandQueue::new(BatchId::new()),
            context: None,
        }
    }

    /// Attach caller correlation, logged with the commit
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Stage an operation by name
    ///
    /// # Errors
    ///
    /// * `UnknownOperation` - the client does not declare `name`
    /// * `ReservedOperation` - `name` is the commit operation; use [`commit`](Self::commit)
    /// * `AlreadyCommitted` - the batch already left the building state
    pub fn call<I, V>(&mut self, name: &str, args: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.append(name, collect_args(args), None)?;
        Ok(self)
    }

    /// Stage an operation with a callback for its reply
    ///
    /// # Errors
    ///
    /// Same as [`call`](Self::call).
    pub fn call_with<I, V, F>(&mut self, name: &str, args: I, on_result: F) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
        F: FnOnce(&Value) + Send + 'static,
    {
        self.append(name, collect_args(args), Some(Box::new(on_result)))?;
        Ok(self)
    }

    /// Attach a callback to the next staged operation
    ///
    /// The returned guard only exposes `call`, so the callback is attached
    /// in the same step as the operation it belongs to.
    pub fn with_callback<F>(&mut self, on_result: F) -> PendingCallback<'_>
    where
        F: FnOnce(&Value) + Send + 'static,
    {
        PendingCallback {
            builder: self,
            on_result: Box::new(on_result),
        }
    }

    /// Commit the batch
    ///
    /// # Errors
    ///
    /// * `AlreadyCommitted` - commit was already invoked on this batch
    /// * any store error, unchanged, when the transaction aborts
    pub async fn commit(&mut self) -> Result<TransactionReply> {
        self.commit_inner(None).await
    }

    /// Commit the batch and report the outcome to `final_callback` as well
    ///
    /// The callback runs after every per-operation callback on success, and
    /// alone on abort. It is not called for `AlreadyCommitted`, which is
    /// returned directly.
    ///
    /// # Errors
    ///
    /// Same as [`commit`](Self::commit).
    pub async fn commit_with<F>(&mut self, final_callback: F) -> Result<TransactionReply>
    where
        F: FnOnce(std::result::Result<&[Value], &BatchError>) + Send + 'static,
    {
        self.commit_inner(Some(Box::new(final_callback))).await
    }

    pub fn batch_id(&self) -> &BatchId {
        self.queue.batch_id()
    }

    /// The underlying queue, for introspection
    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn state(&self) -> BatchState {
        self.queue.state()
    }

    pub fn names(&self) -> Vec<&str> {
        self.queue.names()
    }

    /// Canonical form of an error raised by this batch
    ///
    /// Fills in the batch id and the request context, plus the queue
    /// position when the store refused an operation while staging.
    pub fn ex_error(&self, err: &BatchError) -> ExError {
        let mut ex = ExError::from(err).with_batch_id(self.queue.batch_id().clone());

        if let (BatchError::Store(_), Some(position)) = (err, self.queue.rejected_position()) {
            ex = ex.with_position(position);
        }
        if let Some(context) = &self.context {
            ex = ex.with_request_id(context.request_id.clone());
            if let Some(trace_id) = &context.trace_id {
                ex = ex.with_trace_id(trace_id.clone());
            }
        }
        ex
    }

    fn append(
        &mut self,
        name: &str,
        args: Vec<Value>,
        on_result: Option<OperationCallback>,
    ) -> Result<usize> {
        let name = self.client.operations().resolve(name)?;
        let position = self.queue.append(name, args, on_result)?;

        tracing::trace!(
            component = module_path!(),
            batch_id = %self.queue.batch_id(),
            position,
            operation = self.queue.get(position).map(|op| op.name().as_str()),
            request_id = self.context.as_ref().map(|ctx| ctx.request_id.as_str()),
            "operation queued"
        );
        Ok(position)
    }

    async fn commit_inner(
        &mut self,
        final_callback: Option<FinalCallback>,
    ) -> Result<TransactionReply> {
        let executor = Executor::new(self.client.as_ref()).with_context(self.context.as_ref());
        let outcome = executor.execute(&mut self.queue).await?;

        dispatch::deliver(&mut self.queue, outcome, final_callback)
    }
}

impl std::fmt::Debug for BatchBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchBuilder")
            .field("queue", &self.queue)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// A callback waiting for the operation it belongs to
#[must_use = "a callback is only attached by calling `call`"]
pub struct PendingCallback<'a> {
    builder: &'a mut BatchBuilder,
    on_result: OperationCallback,
}

impl<'a> PendingCallback<'a> {
    /// Stage the operation that receives the pending callback
    ///
    /// # Errors
    ///
    /// Same as [`BatchBuilder::call`]. On error the callback is dropped.
    pub fn call<I, V>(self, name: &str, args: I) -> Result<&'a mut BatchBuilder>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.builder.append(name, collect_args(args), Some(self.on_result))?;
        Ok(self.builder)
    }
}

fn collect_args<I, V>(args: I) -> Vec<Value>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    args.into_iter().map(Into::into).collect()
}
