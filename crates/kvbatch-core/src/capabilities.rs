//! Capability map of stageable operations
//!
//! Each store client declares the operation names it supports once, as an
//! [`OperationSet`]. The batch builder resolves every by-name call against
//! that set, which keeps "any backing operation can be staged" without
//! enumerating operations in the builder itself.

use std::collections::BTreeSet;

use crate::errors::{BatchError, Result};
use crate::model::OperationName;

/// Set of operation names a backing client can stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationSet {
    names: BTreeSet<OperationName>,
}

impl OperationSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    /// Build a set from raw names
    ///
    /// # Errors
    ///
    /// Fails on the first name that is invalid or reserved.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for name in names {
            set.insert(OperationName::new(name)?);
        }
        Ok(set)
    }

    /// Add a name; returns false if it was already present
    pub fn insert(&mut self, name: OperationName) -> bool {
        self.names.insert(name)
    }

    /// Check membership, ignoring case
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name.trim().to_ascii_lowercase().as_str())
    }

    /// Resolve a raw name into a stageable operation
    ///
    /// # Errors
    ///
    /// * `InvalidOperationName` - malformed name
    /// * `ReservedOperation` - the commit name
    /// * `UnknownOperation` - a valid name this client does not declare
    pub fn resolve(&self, name: &str) -> Result<OperationName> {
        let name = OperationName::new(name)?;
        if !self.names.contains(&name) {
            return Err(BatchError::UnknownOperation {
                name: name.as_str().to_string(),
            });
        }
        Ok(name)
    }

    /// Names in lexical order
    pub fn iter(&self) -> impl Iterator<Item = &OperationName> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
