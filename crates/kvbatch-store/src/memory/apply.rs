//! Transaction apply for the memory store
//!
//! ## Atomicity Contract
//!
//! `apply_all()` takes ownership of a working copy of the keyspace and either
//! returns the new keyspace with one reply per command, or fails on the first
//! command that cannot be applied. On failure the caller still holds the
//! original keyspace, which is left untouched.

use kvbatch_core::{OperationName, Value};

use super::command::{Command, End};
use super::keyspace::Keyspace;
use crate::errors::{self, Result};

/// Apply staged commands in order
///
/// # Errors
///
/// Returns the first `WrongType` or `OperationArgument` raised by a command.
pub(crate) fn apply_all(
    mut state: Keyspace,
    staged: &[(OperationName, Command)],
) -> Result<(Keyspace, Vec<Value>)> {
    let mut replies = Vec::with_capacity(staged.len());
    for (name, command) in staged {
        replies.push(apply(&mut state, name.as_str(), command)?);
    }
    Ok((state, replies))
}

fn apply(state: &mut Keyspace, op: &str, command: &Command) -> Result<Value> {
    match command {
        Command::Del { keys } => Ok(count(keys.iter().filter(|k| state.remove(k)).count())),

        Command::Exists { keys } => Ok(count(
            keys.iter().filter(|k| state.contains_key(k)).count(),
        )),

        Command::Set { key, value } => {
            state.put_string(key, value.clone());
            Ok(Value::ok())
        }

        Command::Get { key } => Ok(state.string(op, key)?.cloned().into()),

        Command::Append { key, value } => {
            let mut current = state.string(op, key)?.cloned().unwrap_or_default();
            current.push_str(value);
            let len = current.len();
            state.put_string(key, current);
            Ok(count(len))
        }

        Command::Strlen { key } => Ok(count(state.string(op, key)?.map_or(0, String::len))),

        Command::IncrBy { key, delta } => {
            let current = match state.string(op, key)? {
                Some(text) => text.parse::<i64>().map_err(|_| errors::not_integer(op))?,
                None => 0,
            };
            let next = current
                .checked_add(*delta)
                .ok_or_else(|| errors::overflow(op))?;
            state.put_string(key, next.to_string());
            Ok(Value::Int(next))
        }

        Command::MSet { pairs } => {
            for (key, value) in pairs {
                state.put_string(key, value.clone());
            }
            Ok(Value::ok())
        }

        // Keys holding other kinds read as nil rather than failing
        Command::MGet { keys } => Ok(Value::Array(
            keys.iter()
                .map(|key| state.string(op, key).ok().flatten().cloned().into())
                .collect(),
        )),

        Command::Push { key, end, values } => {
            let list = state.list_mut(op, key)?;
            for value in values {
                match end {
                    End::Left => list.push_front(value.clone()),
                    End::Right => list.push_back(value.clone()),
                }
            }
            Ok(count(list.len()))
        }

        Command::Pop { key, end } => {
            if state.list(op, key)?.is_none() {
                return Ok(Value::Nil);
            }
            let list = state.list_mut(op, key)?;
            let popped = match end {
                End::Left => list.pop_front(),
                End::Right => list.pop_back(),
            };
            state.prune(key);
            Ok(popped.into())
        }

        Command::LRange { key, start, stop } => {
            let Some(list) = state.list(op, key)? else {
                return Ok(Value::Array(Vec::new()));
            };
            let items = match range_bounds(list.len(), *start, *stop) {
                Some((from, to)) => list
                    .iter()
                    .skip(from)
                    .take(to - from + 1)
                    .cloned()
                    .map(Value::Bulk)
                    .collect(),
                None => Vec::new(),
            };
            Ok(Value::Array(items))
        }

        Command::LLen { key } => Ok(count(state.list(op, key)?.map_or(0, |l| l.len()))),

        Command::HSet { key, fields } => {
            let hash = state.hash_mut(op, key)?;
            let added = fields
                .iter()
                .filter(|(field, value)| hash.insert(field.clone(), value.clone()).is_none())
                .count();
            Ok(count(added))
        }

        Command::HGet { key, field } => Ok(state
            .hash(op, key)?
            .and_then(|hash| hash.get(field))
            .cloned()
            .into()),

        Command::HDel { key, fields } => {
            if state.hash(op, key)?.is_none() {
                return Ok(Value::Int(0));
            }
            let hash = state.hash_mut(op, key)?;
            let removed = fields.iter().filter(|f| hash.remove(*f).is_some()).count();
            state.prune(key);
            Ok(count(removed))
        }

        Command::HGetAll { key } => Ok(Value::Array(
            state
                .hash(op, key)?
                .map(|hash| {
                    hash.iter()
                        .flat_map(|(f, v)| [Value::Bulk(f.clone()), Value::Bulk(v.clone())])
                        .collect()
                })
                .unwrap_or_default(),
        )),

        Command::SAdd { key, members } => {
            let set = state.set_mut(op, key)?;
            let added = members.iter().filter(|m| set.insert((*m).clone())).count();
            Ok(count(added))
        }

        Command::SRem { key, members } => {
            if state.set(op, key)?.is_none() {
                return Ok(Value::Int(0));
            }
            let set = state.set_mut(op, key)?;
            let removed = members.iter().filter(|m| set.remove(*m)).count();
            state.prune(key);
            Ok(count(removed))
        }

        Command::SMembers { key } => Ok(Value::Array(
            state
                .set(op, key)?
                .map(|set| set.iter().cloned().map(Value::Bulk).collect())
                .unwrap_or_default(),
        )),

        Command::SIsMember { key, member } => Ok(Value::Int(i64::from(
            state.set(op, key)?.is_some_and(|set| set.contains(member)),
        ))),

        Command::SCard { key } => Ok(count(state.set(op, key)?.map_or(0, |s| s.len()))),
    }
}

fn count(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

/// Inclusive `[from, to]` window of a list, with negative indices counted from the end
fn range_bounds(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = i64::try_from(len).ok()?;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((usize::try_from(start).ok()?, usize::try_from(stop).ok()?))
}
