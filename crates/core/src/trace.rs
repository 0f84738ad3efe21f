// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-task metric record written to the trace log and cached alongside the
//! task's context

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single trace field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Path(PathBuf),
}

impl TraceValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TraceValue::Integer(n) => Some(*n),
            TraceValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TraceValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Standard field names, kept as constants so the engine and the CLI's
/// `-fields`/`-filter` machinery agree on spelling
pub mod fields {
    pub const TASK_ID: &str = "task_id";
    pub const PROCESS: &str = "process";
    pub const EXIT: &str = "exit";
    pub const SUBMIT: &str = "submit";
    pub const START: &str = "start";
    pub const COMPLETE: &str = "complete";
    pub const REALTIME: &str = "realtime";
    pub const CPU_PERCENT: &str = "%cpu";
    pub const VMEM: &str = "vmem";
    pub const RSS: &str = "rss";
    pub const FOLDER: &str = "folder";
}

/// An ordered `name -> value` mapping of task metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord(IndexMap<String, TraceValue>);

impl TraceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: TraceValue) -> &mut Self {
        self.0.insert(field.into(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&TraceValue> {
        self.0.get(field)
    }

    pub fn exit_code(&self) -> Option<i64> {
        self.get(fields::EXIT).and_then(TraceValue::as_i64)
    }

    pub fn folder(&self) -> Option<&str> {
        self.get(fields::FOLDER).and_then(TraceValue::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TraceValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "trace_tests.rs"]
mod tests;
