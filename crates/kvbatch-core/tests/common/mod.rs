use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kvbatch_core::{OperationName, OperationSet, StoreClient, StoreError, TransactionHandle, Value};

/// What the fake store does when a transaction commits
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum CommitBehavior {
    /// Reply `"<position>:<name>"` for every staged operation
    Echo,
    /// Abort the transaction with this error
    Fail(StoreError),
    /// Reply with exactly these values, whatever was staged
    Replies(Vec<Value>),
}

/// Everything the fake store observed
#[derive(Debug, Default)]
pub struct StoreLog {
    pub transactions_opened: usize,
    pub commits: usize,
    pub staged: Vec<(String, Vec<Value>)>,
}

/// Store client double with scripted commit behaviour
pub struct FakeClient {
    operations: OperationSet,
    behavior: CommitBehavior,
    reject_stage: Option<String>,
    log: Arc<Mutex<StoreLog>>,
}

#[allow(dead_code)]
impl FakeClient {
    pub fn new(behavior: CommitBehavior) -> Self {
        Self {
            operations: OperationSet::from_names([
                "set", "get", "del", "incr", "lpush", "lrange", "hset", "hget",
            ])
            .unwrap(),
            behavior,
            reject_stage: None,
            log: Arc::new(Mutex::new(StoreLog::default())),
        }
    }

    pub fn echo() -> Arc<Self> {
        Arc::new(Self::new(CommitBehavior::Echo))
    }

    pub fn failing(err: StoreError) -> Arc<Self> {
        Arc::new(Self::new(CommitBehavior::Fail(err)))
    }

    /// Reject staging of the named operation with an argument error
    pub fn rejecting_stage(mut self, name: &str) -> Self {
        self.reject_stage = Some(name.to_string());
        self
    }

    pub fn log(&self) -> std::sync::MutexGuard<'_, StoreLog> {
        self.log.lock().unwrap()
    }
}

impl StoreClient for FakeClient {
    fn operations(&self) -> &OperationSet {
        &self.operations
    }

    fn begin_transaction(&self) -> Box<dyn TransactionHandle> {
        self.log.lock().unwrap().transactions_opened += 1;
        Box::new(FakeTransaction {
            behavior: self.behavior.clone(),
            reject_stage: self.reject_stage.clone(),
            staged: Vec::new(),
            log: Arc::clone(&self.log),
        })
    }
}

struct FakeTransaction {
    behavior: CommitBehavior,
    reject_stage: Option<String>,
    staged: Vec<String>,
    log: Arc<Mutex<StoreLog>>,
}

#[async_trait]
impl TransactionHandle for FakeTransaction {
    fn stage(&mut self, name: &OperationName, args: Vec<Value>) -> Result<(), StoreError> {
        if self.reject_stage.as_deref() == Some(name.as_str()) {
            return Err(StoreError::OperationArgument {
                op: name.to_string(),
                reason: "rejected by fake store".to_string(),
            });
        }
        self.log
            .lock()
            .unwrap()
            .staged
            .push((name.to_string(), args));
        self.staged.push(name.to_string());
        Ok(())
    }

    async fn commit(&mut self) -> Result<Vec<Value>, StoreError> {
        tokio::task::yield_now().await;
        self.log.lock().unwrap().commits += 1;

        match &self.behavior {
            CommitBehavior::Echo => Ok(self
                .staged
                .iter()
                .enumerate()
                .map(|(i, name)| Value::Bulk(format!("{}:{}", i, name)))
                .collect()),
            CommitBehavior::Fail(err) => Err(err.clone()),
            CommitBehavior::Replies(replies) => Ok(replies.clone()),
        }
    }
}

/// Shared, ordered record of callback invocations
#[allow(dead_code)]
pub type CallLog = Arc<Mutex<Vec<String>>>;

#[allow(dead_code)]
pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}
