//! Per-run registries of named types.
//!
//! A generation run fills these in declaration order. Lookups made before a
//! name is registered see it as unknown; that ordering is part of the input
//! contract, not something the registries try to repair.

use std::collections::{BTreeSet, HashMap};

/// Opaque handle types seen so far, by prefix-stripped name.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    names: BTreeSet<String>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class. Returns `false` if it was already known.
    pub fn register(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Emitted field names of every struct and union, by mapped type name.
#[derive(Debug, Clone, Default)]
pub struct StructFieldIndex {
    fields: HashMap<String, Vec<String>>,
}

impl StructFieldIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: impl Into<String>, fields: Vec<String>) {
        self.fields.insert(name.into(), fields);
    }

    /// Field names in declaration order, if the record is known.
    pub fn fields(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

/// Enumerations emitted so far, by mapped type name.
#[derive(Debug, Clone, Default)]
pub struct EnumRegistry {
    names: BTreeSet<String>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
