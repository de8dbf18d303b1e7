//! Parsed memory-store commands
//!
//! Staging turns `(name, args)` into a [`Command`], so arity and integer
//! arguments are checked before anything reaches the keyspace.

use kvbatch_core::{OperationName, Value};

use crate::errors::{self, Result};

/// Operations the memory store implements
pub const OPERATIONS: &[&str] = &[
    // keys
    "del",
    "exists",
    // strings
    "set",
    "get",
    "append",
    "strlen",
    "incr",
    "decr",
    "incrby",
    "decrby",
    "mset",
    "mget",
    // lists
    "lpush",
    "rpush",
    "lpop",
    "rpop",
    "lrange",
    "llen",
    // hashes
    "hset",
    "hget",
    "hdel",
    "hgetall",
    // sets
    "sadd",
    "srem",
    "smembers",
    "sismember",
    "scard",
];

/// List end an operation works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum End {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Del { keys: Vec<String> },
    Exists { keys: Vec<String> },
    Set { key: String, value: String },
    Get { key: String },
    Append { key: String, value: String },
    Strlen { key: String },
    IncrBy { key: String, delta: i64 },
    MSet { pairs: Vec<(String, String)> },
    MGet { keys: Vec<String> },
    Push { key: String, end: End, values: Vec<String> },
    Pop { key: String, end: End },
    LRange { key: String, start: i64, stop: i64 },
    LLen { key: String },
    HSet { key: String, fields: Vec<(String, String)> },
    HGet { key: String, field: String },
    HDel { key: String, fields: Vec<String> },
    HGetAll { key: String },
    SAdd { key: String, members: Vec<String> },
    SRem { key: String, members: Vec<String> },
    SMembers { key: String },
    SIsMember { key: String, member: String },
    SCard { key: String },
}

impl Command {
    /// Parse a staged operation
    ///
    /// # Errors
    ///
    /// Returns `OperationArgument` for wrong arity, non-scalar arguments,
    /// non-integer numeric arguments or a name this store does not implement.
    pub(crate) fn parse(name: &OperationName, args: Vec<Value>) -> Result<Self> {
        let args = Args {
            op: name.as_str(),
            values: args,
        };

        let command = match args.op {
            "del" => Command::Del {
                keys: args.min(1)?.texts(0)?,
            },
            "exists" => Command::Exists {
                keys: args.min(1)?.texts(0)?,
            },
            "set" => Command::Set {
                key: args.exact(2)?.text(0)?,
                value: args.text(1)?,
            },
            "get" => Command::Get {
                key: args.exact(1)?.text(0)?,
            },
            "append" => Command::Append {
                key: args.exact(2)?.text(0)?,
                value: args.text(1)?,
            },
            "strlen" => Command::Strlen {
                key: args.exact(1)?.text(0)?,
            },
            "incr" => Command::IncrBy {
                key: args.exact(1)?.text(0)?,
                delta: 1,
            },
            "decr" => Command::IncrBy {
                key: args.exact(1)?.text(0)?,
                delta: -1,
            },
            "incrby" => Command::IncrBy {
                key: args.exact(2)?.text(0)?,
                delta: args.int(1)?,
            },
            "decrby" => Command::IncrBy {
                key: args.exact(2)?.text(0)?,
                delta: args
                    .int(1)?
                    .checked_neg()
                    .ok_or_else(|| errors::overflow(args.op))?,
            },
            "mset" => Command::MSet {
                pairs: args.pairs(0)?,
            },
            "mget" => Command::MGet {
                keys: args.min(1)?.texts(0)?,
            },
            "lpush" | "rpush" => Command::Push {
                key: args.min(2)?.text(0)?,
                end: if args.op == "lpush" {
                    End::Left
                } else {
                    End::Right
                },
                values: args.texts(1)?,
            },
            "lpop" | "rpop" => Command::Pop {
                key: args.exact(1)?.text(0)?,
                end: if args.op == "lpop" {
                    End::Left
                } else {
                    End::Right
                },
            },
            "lrange" => Command::LRange {
                key: args.exact(3)?.text(0)?,
                start: args.int(1)?,
                stop: args.int(2)?,
            },
            "llen" => Command::LLen {
                key: args.exact(1)?.text(0)?,
            },
            "hset" => Command::HSet {
                key: args.min(3)?.text(0)?,
                fields: args.pairs(1)?,
            },
            "hget" => Command::HGet {
                key: args.exact(2)?.text(0)?,
                field: args.text(1)?,
            },
            "hdel" => Command::HDel {
                key: args.min(2)?.text(0)?,
                fields: args.texts(1)?,
            },
            "hgetall" => Command::HGetAll {
                key: args.exact(1)?.text(0)?,
            },
            "sadd" => Command::SAdd {
                key: args.min(2)?.text(0)?,
                members: args.texts(1)?,
            },
            "srem" => Command::SRem {
                key: args.min(2)?.text(0)?,
                members: args.texts(1)?,
            },
            "smembers" => Command::SMembers {
                key: args.exact(1)?.text(0)?,
            },
            "sismember" => Command::SIsMember {
                key: args.exact(2)?.text(0)?,
                member: args.text(1)?,
            },
            "scard" => Command::SCard {
                key: args.exact(1)?.text(0)?,
            },
            other => return Err(errors::unsupported(other)),
        };

        Ok(command)
    }
}

struct Args<'a> {
    op: &'a str,
    values: Vec<Value>,
}

impl Args<'_> {
    fn exact(&self, n: usize) -> Result<&Self> {
        if self.values.len() != n {
            return Err(errors::arity(self.op, &n.to_string(), self.values.len()));
        }
        Ok(self)
    }

    fn min(&self, n: usize) -> Result<&Self> {
        if self.values.len() < n {
            return Err(errors::arity(
                self.op,
                &format!("at least {}", n),
                self.values.len(),
            ));
        }
        Ok(self)
    }

    fn text(&self, position: usize) -> Result<String> {
        self.values
            .get(position)
            .and_then(Value::as_text)
            .ok_or_else(|| errors::not_scalar(self.op, position))
    }

    fn texts(&self, from: usize) -> Result<Vec<String>> {
        (from..self.values.len()).map(|i| self.text(i)).collect()
    }

    fn int(&self, position: usize) -> Result<i64> {
        self.values
            .get(position)
            .and_then(Value::as_int)
            .ok_or_else(|| errors::not_integer(self.op))
    }

    /// Non-empty run of `(field, value)` pairs starting at `from`
    fn pairs(&self, from: usize) -> Result<Vec<(String, String)>> {
        let rest = self.values.len().saturating_sub(from);
        if rest == 0 || rest % 2 != 0 {
            return Err(errors::arity(
                self.op,
                &format!("{} plus field/value pairs", from),
                self.values.len(),
            ));
        }
        (from..self.values.len())
            .step_by(2)
            .map(|i| -> Result<(String, String)> { Ok((self.text(i)?, self.text(i + 1)?)) })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvbatch_core::StoreError;

    fn parse(name: &str, args: Vec<Value>) -> Result<Command> {
        Command::parse(&OperationName::new(name).unwrap(), args)
    }

    #[test]
    fn test_every_declared_operation_parses() {
        // Three scalar args satisfy every arity in the table except the pair forms
        for name in OPERATIONS {
            let args: Vec<Value> = match *name {
                "set" | "append" | "hget" | "sismember" | "incrby" | "decrby" => {
                    vec!["k".into(), 1.into()]
                }
                "mset" => vec!["k".into(), "v".into()],
                "hset" => vec!["h".into(), "f".into(), "v".into()],
                "lrange" => vec!["l".into(), 0.into(), (-1).into()],
                "lpush" | "rpush" | "hdel" | "sadd" | "srem" => vec!["k".into(), "m".into()],
                _ => vec!["k".into()],
            };
            assert!(parse(name, args).is_ok(), "{} should parse", name);
        }
    }

    #[test]
    fn test_arity_checked_at_parse() {
        let err = parse("get", vec!["a".into(), "b".into()]).unwrap_err();
        assert!(matches!(err, StoreError::OperationArgument { ref op, .. } if op == "get"));

        assert!(parse("hset", vec!["h".into(), "f".into()]).is_err());
        assert!(parse("mset", vec!["a".into(), "1".into(), "b".into()]).is_err());
    }

    #[test]
    fn test_integer_arguments() {
        assert_eq!(
            parse("incrby", vec!["n".into(), "5".into()]).unwrap(),
            Command::IncrBy {
                key: "n".to_string(),
                delta: 5
            }
        );
        assert_eq!(
            parse("decrby", vec!["n".into(), Value::Int(2)]).unwrap(),
            Command::IncrBy {
                key: "n".to_string(),
                delta: -2
            }
        );
        assert!(parse("incrby", vec!["n".into(), "five".into()]).is_err());
        assert!(parse("decrby", vec!["n".into(), Value::Int(i64::MIN)]).is_err());
    }

    #[test]
    fn test_non_scalar_arguments_rejected() {
        let err = parse("set", vec!["k".into(), Value::Nil]).unwrap_err();
        assert!(err.to_string().contains("argument 1"));
    }

    #[test]
    fn test_integers_are_stored_as_text() {
        assert_eq!(
            parse("set", vec!["k".into(), Value::Int(10)]).unwrap(),
            Command::Set {
                key: "k".to_string(),
                value: "10".to_string()
            }
        );
    }

    #[test]
    fn test_undeclared_operation_unsupported() {
        assert!(parse("flushall", vec![]).is_err());
    }
}
