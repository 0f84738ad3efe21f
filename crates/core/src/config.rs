// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-wide runtime tunables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Hash mode for task fingerprinting
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashMode {
    /// File inputs are canonicalized by `(size, lastModified, path)`.
    #[default]
    Standard,
    /// File inputs are hashed byte-wise.
    Deep,
}

/// Error strategy for a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStrategy {
    /// Fault the whole session.
    Terminate,
    /// Mark the task failed, let in-flight tasks finish, then quiesce.
    Finish,
    /// Log and continue.
    Ignore,
    /// Requeue up to `maxRetries`, subject to the session-wide `maxErrors` budget.
    Retry,
}

impl Default for ErrorStrategy {
    fn default() -> Self {
        ErrorStrategy::Terminate
    }
}

/// Session-wide tunables the distilled spec left as implicit defaults (§10.4).
///
/// This subsystem does not own the pipeline-DSL config file format; an
/// embedding CLI may load overrides from TOML and construct this
/// programmatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Grace period `Session::abort` waits for quiescence before forcing shutdown.
    pub abort_grace_period: Duration,
    /// Interval at which the monitor polls grid executors for status changes.
    pub monitor_poll_interval: Duration,
    /// Default `maxForks` for processors that don't override it.
    pub default_max_forks: usize,
    /// Default error strategy for processors that don't override it.
    pub default_error_strategy: ErrorStrategy,
    /// Default hash mode for fingerprinting.
    pub default_hash_mode: HashMode,
    /// Root directory for task working directories.
    pub work_dir: PathBuf,
    /// Base directory containing `.cache/` and `.nextflow.history`-equivalent files.
    pub base_dir: PathBuf,
    /// Number of lines fetched by default for the CLI `log -F` lazy stdout/stderr/log keys.
    pub log_filter_tail_lines: usize,
    /// Session-wide cap on unignored errors before a `RETRY` strategy gives up;
    /// -1 means unbounded.
    pub max_errors: i64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            abort_grace_period: Duration::from_secs(30),
            monitor_poll_interval: Duration::from_secs(5),
            default_max_forks: num_cpus_fallback(),
            default_error_strategy: ErrorStrategy::Terminate,
            default_hash_mode: HashMode::Standard,
            work_dir: PathBuf::from("work"),
            base_dir: PathBuf::from("."),
            log_filter_tail_lines: 100,
            max_errors: -1,
        }
    }
}

/// Best-effort parallelism default without pulling in a CPU-detection crate:
/// mirrors the number of available cores as reported by the standard library,
/// falling back to 1 on platforms where detection fails.
fn num_cpus_fallback() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl RuntimeConfig {
    /// Load overrides from a TOML file, falling back to defaults for absent fields.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn cache_dir(&self, session_id: &str) -> PathBuf {
        self.base_dir.join(".cache").join(session_id)
    }

    pub fn history_file(&self) -> PathBuf {
        self.base_dir.join(".nextflow.history")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
