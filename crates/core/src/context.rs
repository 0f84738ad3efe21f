// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The variable binding captured at task-resolve time

use crate::value::ContextValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An ordered `name -> value` mapping, serializable bit-for-bit so it can be
/// used as part of a cache key and cached verbatim for `-resume`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskContext(IndexMap<String, ContextValue>);

impl TaskContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ContextValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ContextValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterate in binding (insertion) order — the order fingerprinting and
    /// serialization rely on.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serializes to a canonical JSON string — used both as the persisted
    /// `.command.context` payload and as the cached value in [`Cache`].
    ///
    /// [`Cache`]: https://docs.rs/rflow-storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
