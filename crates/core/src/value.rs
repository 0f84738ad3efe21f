// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Values bound into a [`crate::context::TaskContext`] or collected as a
//! task output

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A value flowing through the dataflow network: a scalar, a staged file
/// (or list of them), or a nested list (used by the `flatten`/`combine`
/// output binding modes and by `each`-input expansion).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ContextValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// A single staged file path (workDir-relative or absolute).
    Path(PathBuf),
    /// An unordered bag of staged file paths — the representation a
    /// multi-valued file input normalizes to
    Paths(Vec<PathBuf>),
    List(Vec<ContextValue>),
    Null,
}

impl ContextValue {
    pub fn text(s: impl Into<String>) -> Self {
        ContextValue::Text(s.into())
    }

    pub fn path(p: impl Into<PathBuf>) -> Self {
        ContextValue::Path(p.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContextValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ContextValue::Path(p) => Some(p),
            _ => None,
        }
    }

    /// All file paths reachable from this value, in encounter order.
    pub fn file_paths(&self) -> Vec<&Path> {
        match self {
            ContextValue::Path(p) => vec![p.as_path()],
            ContextValue::Paths(ps) => ps.iter().map(|p| p.as_path()).collect(),
            ContextValue::List(items) => items.iter().flat_map(|v| v.file_paths()).collect(),
            _ => Vec::new(),
        }
    }

    /// Recursively flatten nested lists into a single leaf sequence, per the
    /// `flatten` output binding mode
    pub fn flatten_leaves(&self) -> Vec<ContextValue> {
        match self {
            ContextValue::List(items) => items.iter().flat_map(|v| v.flatten_leaves()).collect(),
            other => vec![other.clone()],
        }
    }

    /// A stable textual rendering used when a value is interpolated into a
    /// task's variable binding (e.g. for fingerprinting non-file inputs).
    pub fn canonical_text(&self) -> String {
        match self {
            ContextValue::Text(s) => s.clone(),
            ContextValue::Integer(i) => i.to_string(),
            ContextValue::Float(f) => f.to_string(),
            ContextValue::Boolean(b) => b.to_string(),
            ContextValue::Path(p) => p.display().to_string(),
            ContextValue::Paths(ps) => {
                let mut rendered: Vec<String> = ps.iter().map(|p| p.display().to_string()).collect();
                rendered.sort();
                rendered.join(",")
            }
            ContextValue::List(items) => items
                .iter()
                .map(|v| v.canonical_text())
                .collect::<Vec<_>>()
                .join(","),
            ContextValue::Null => String::new(),
        }
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
