//! Run a batch script as one atomic batch

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use kvbatch_core::{BatchBuilder, BatchError, ExError, ExErrorKind, Value};
use kvbatch_core_types::RequestContext;
use serde::Serialize;

use crate::script;
use crate::settings::Settings;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Script with one `operation arg...` per line
    pub script: PathBuf,

    /// Print one JSON object per line instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Text,
    Json,
}

#[derive(Serialize)]
struct OperationReport<'a> {
    position: usize,
    operation: &'a str,
    reply: &'a Value,
}

#[derive(Serialize)]
struct BatchReport<'a> {
    batch_id: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    replies: Option<&'a [Value]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorReport<'a>>,
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<&'a str>,
}

impl Output {
    fn operation(self, position: usize, operation: &str, reply: &Value) {
        match self {
            Output::Text => println!("{}) {} -> {}", position, operation, reply),
            Output::Json => {
                let report = OperationReport {
                    position,
                    operation,
                    reply,
                };
                if let Err(ex) = print_json(&report) {
                    tracing::error!(
                        component = module_path!(),
                        position,
                        err.code = ex.code(),
                        error = %ex,
                        "reply not printed"
                    );
                }
            }
        }
    }

    fn committed(self, batch_id: &str, replies: &[Value]) -> Result<(), ExError> {
        match self {
            Output::Text => {
                println!("committed {}", Value::Array(replies.to_vec()));
                Ok(())
            }
            Output::Json => print_json(&BatchReport {
                batch_id,
                status: "committed",
                replies: Some(replies),
                error: None,
            }),
        }
    }

    /// Text mode prints nothing; `main` reports the error on stderr
    fn aborted(self, batch_id: &str, err: &BatchError, ex: &ExError) -> Result<(), ExError> {
        match self {
            Output::Text => Ok(()),
            Output::Json => print_json(&BatchReport {
                batch_id,
                status: "aborted",
                replies: None,
                error: Some(ErrorReport {
                    code: ex.code(),
                    message: err.to_string(),
                    operation: ex.op(),
                    position: ex.position(),
                    request_id: ex.request_id().map(|id| id.as_str()),
                }),
            }),
        }
    }
}

fn print_json<T: Serialize>(report: &T) -> Result<(), ExError> {
    let line = serde_json::to_string(report)
        .map_err(|err| ExError::new(ExErrorKind::Serialization).with_message(err.to_string()))?;
    println!("{}", line);
    Ok(())
}

pub async fn execute(args: RunArgs, settings: &Settings) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&args.script).map_err(|err| {
        ExError::new(ExErrorKind::Io)
            .with_message(format!("reading script {}: {}", args.script.display(), err))
    })?;
    let lines = script::parse(&source)?;

    let output = if args.json || settings.output.json {
        Output::Json
    } else {
        Output::Text
    };

    let store = super::open_store(settings).await?;
    let mut batch = BatchBuilder::new(store).with_context(RequestContext::new());
    let batch_id = batch.batch_id().to_string();

    for (position, line) in lines.into_iter().enumerate() {
        let name = line.name.to_ascii_lowercase();
        batch
            .call_with(&line.name, line.args, move |reply: &Value| {
                output.operation(position, &name, reply);
            })
            .with_context(|| format!("line {}: cannot stage '{}'", line.number, line.name))?;
    }

    tracing::debug!(
        component = module_path!(),
        batch_id = %batch_id,
        batch_len = batch.len(),
        "script staged"
    );

    match batch.commit().await {
        Ok(replies) => {
            output.committed(&batch_id, &replies)?;
            Ok(())
        }
        Err(err) => {
            output.aborted(&batch_id, &err, &batch.ex_error(&err))?;
            Err(anyhow::Error::new(err).context(format!("batch {} aborted", batch_id)))
        }
    }
}
