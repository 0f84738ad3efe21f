// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `TaskProcessor` configuration: inputs, outputs, and scheduling directives.

use crate::config::ErrorStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic identifier assigned within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessorId(pub u64);

impl fmt::Display for ProcessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a formal input parameter is bound for one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputKind {
    /// Bound by name into the context; one value per binding.
    Value,
    /// Iterable-expanding: a forwarding operator multiplies bindings over
    /// the Cartesian product of all `each` inputs.
    Each,
    /// Staged file(s), resolved against `pattern` with wildcard expansion.
    File { pattern: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDef {
    pub name: String,
    pub kind: InputKind,
}

impl InputDef {
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: InputKind::Value,
        }
    }

    pub fn each(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: InputKind::Each,
        }
    }

    pub fn file(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: InputKind::File {
                pattern: pattern.into(),
            },
        }
    }

    pub fn is_each(&self) -> bool {
        matches!(self.kind, InputKind::Each)
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, InputKind::File { .. })
    }
}

/// Directory-walk options for glob output collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobOptions {
    pub hidden: bool,
    pub follow_links: bool,
    pub max_depth: Option<usize>,
    pub entry_type: EntryType,
}

impl Default for GlobOptions {
    fn default() -> Self {
        Self {
            hidden: false,
            follow_links: false,
            max_depth: None,
            entry_type: EntryType::Any,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    File,
    Dir,
    Any,
}

/// Where a declared output's value comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputSource {
    Stdout,
    File {
        pattern: String,
        include_inputs: bool,
        glob_opts: GlobOptions,
    },
    Value {
        expr: String,
    },
}

/// How a collected output is bound onto the output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindMode {
    Standard,
    Flatten,
    Combine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDef {
    pub name: String,
    pub source: OutputSource,
    pub mode: BindMode,
}

/// Scheduling/resource directives materialized into a `TaskConfig` per task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Directives {
    pub cpus: Option<u32>,
    pub memory: Option<String>,
    pub time: Option<String>,
    pub queue: Option<String>,
    pub cluster_options: Option<String>,
    /// Container image for executors that run tasks inside a container
    /// (currently only the Kubernetes backend).
    pub container_image: Option<String>,
    pub max_forks: Option<usize>,
    pub max_retries: u32,
    /// Per-process `maxErrors` override; `None` defers to the session's
    /// budget, `Some(-1)` is explicitly unbounded.
    pub max_errors: Option<i64>,
    pub error_strategy: Option<ErrorStrategy>,
}

/// Static configuration of one process definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    pub name: String,
    pub inputs: Vec<InputDef>,
    pub outputs: Vec<OutputDef>,
    pub directives: Directives,
    /// Optional `when` guard expression; on false the task finalizes as skipped.
    pub when_guard: Option<String>,
    /// Optional `storeDir`: if present and already populated, short-circuits
    /// as cached without consulting the Cache store.
    pub store_dir: Option<std::path::PathBuf>,
    pub hash_mode: crate::config::HashMode,
}

impl ProcessorConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            directives: Directives::default(),
            when_guard: None,
            store_dir: None,
            hash_mode: crate::config::HashMode::Standard,
        }
    }

    pub fn has_each_input(&self) -> bool {
        self.inputs.iter().any(InputDef::is_each)
    }

    /// Termination rule : the processor stops after its first
    /// binding iff all inputs are scalar `Value`s and no `each` is present.
    pub fn terminates_after_first_binding(&self) -> bool {
        !self.has_each_input()
            && self
                .inputs
                .iter()
                .all(|i| matches!(i.kind, InputKind::Value))
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
