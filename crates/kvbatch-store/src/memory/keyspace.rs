use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::errors::{self, Result};

/// A stored value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Str(String),
    List(VecDeque<String>),
    Hash(BTreeMap<String, String>),
    Set(BTreeSet<String>),
}

impl Entry {
    pub fn kind(&self) -> &'static str {
        match self {
            Entry::Str(_) => "string",
            Entry::List(_) => "list",
            Entry::Hash(_) => "hash",
            Entry::Set(_) => "set",
        }
    }

    fn is_empty_collection(&self) -> bool {
        match self {
            Entry::Str(_) => false,
            Entry::List(list) => list.is_empty(),
            Entry::Hash(hash) => hash.is_empty(),
            Entry::Set(set) => set.is_empty(),
        }
    }
}

/// In-memory keyspace
///
/// Typed accessors fail with `WrongType` when a key holds another kind of
/// value. Collections that become empty are removed, so an empty list, hash
/// or set is indistinguishable from a missing key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyspace {
    entries: HashMap<String, Entry>,
}

impl Keyspace {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in lexical order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub(crate) fn put_string(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), Entry::Str(value));
    }

    pub(crate) fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub(crate) fn string(&self, op: &str, key: &str) -> Result<Option<&String>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Entry::Str(value)) => Ok(Some(value)),
            Some(_) => Err(errors::wrong_type(op, key)),
        }
    }

    pub(crate) fn list(&self, op: &str, key: &str) -> Result<Option<&VecDeque<String>>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Entry::List(list)) => Ok(Some(list)),
            Some(_) => Err(errors::wrong_type(op, key)),
        }
    }

    pub(crate) fn hash(&self, op: &str, key: &str) -> Result<Option<&BTreeMap<String, String>>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Entry::Hash(hash)) => Ok(Some(hash)),
            Some(_) => Err(errors::wrong_type(op, key)),
        }
    }

    pub(crate) fn set(&self, op: &str, key: &str) -> Result<Option<&BTreeSet<String>>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Entry::Set(set)) => Ok(Some(set)),
            Some(_) => Err(errors::wrong_type(op, key)),
        }
    }

    /// List at `key`, created empty if missing
    pub(crate) fn list_mut(&mut self, op: &str, key: &str) -> Result<&mut VecDeque<String>> {
        match self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()))
        {
            Entry::List(list) => Ok(list),
            _ => Err(errors::wrong_type(op, key)),
        }
    }

    /// Hash at `key`, created empty if missing
    pub(crate) fn hash_mut(
        &mut self,
        op: &str,
        key: &str,
    ) -> Result<&mut BTreeMap<String, String>> {
        match self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Hash(BTreeMap::new()))
        {
            Entry::Hash(hash) => Ok(hash),
            _ => Err(errors::wrong_type(op, key)),
        }
    }

    /// Set at `key`, created empty if missing
    pub(crate) fn set_mut(&mut self, op: &str, key: &str) -> Result<&mut BTreeSet<String>> {
        match self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(BTreeSet::new()))
        {
            Entry::Set(set) => Ok(set),
            _ => Err(errors::wrong_type(op, key)),
        }
    }

    /// Drop `key` if it holds an empty collection
    pub(crate) fn prune(&mut self, key: &str) {
        if self
            .entries
            .get(key)
            .is_some_and(Entry::is_empty_collection)
        {
            self.entries.remove(key);
        }
    }
}
