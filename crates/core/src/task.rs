// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task identifier, config, and run state.
//!
//! A `TaskRun` is one concrete invocation of a `TaskProcessor`: a resolved
//! context, a working directory, and whatever the executor reports back.
//! Each failed attempt that gets retried produces a new `TaskRun` sharing
//! the same `TaskId` lineage but a distinct attempt number.

use crate::context::TaskContext;
use crate::fingerprint::Fingerprint;
use crate::processor::{Directives, ProcessorId};
use crate::trace::TraceRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

crate::define_id! {
    /// 128-bit task identifier, stable across retries of the same attempt
    /// lineage (the attempt number distinguishes retries, not the id).
    pub struct TaskId;
}

/// Distinguishes a first submission from a retry re-submission so executors
/// and loggers can label attempts distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    Submit,
    Retry,
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunType::Submit => write!(f, "SUBMIT"),
            RunType::Retry => write!(f, "RETRY"),
        }
    }
}

/// Process exit code, with a reserved sentinel for "not yet known".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitStatus(i32);

impl ExitStatus {
    /// Sentinel used while a task has not yet produced a real exit code.
    pub const UNKNOWN: ExitStatus = ExitStatus(i32::MAX);

    pub fn new(code: i32) -> Self {
        ExitStatus(code)
    }

    pub fn code(&self) -> i32 {
        self.0
    }

    pub fn is_known(&self) -> bool {
        self.0 != i32::MAX
    }

    pub fn is_success(&self) -> bool {
        self.0 == 0
    }
}

impl Default for ExitStatus {
    fn default() -> Self {
        ExitStatus::UNKNOWN
    }
}

/// Terminal/in-flight lifecycle state of a task run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Context resolved, not yet submitted to an executor.
    New,
    /// Handed to the executor, waiting on resources.
    Submitted,
    /// Executor reports the process is running.
    Running,
    /// Process exited; outputs not yet collected.
    Completed,
    /// Outputs collected and bound successfully.
    Succeeded,
    /// Failed past all retries (or non-retryable).
    Failed,
    /// `when` guard evaluated false; never executed.
    Skipped,
    /// Satisfied from the cache without running.
    Cached,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Skipped | TaskStatus::Cached
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::New => "NEW",
            TaskStatus::Submitted => "SUBMITTED",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Succeeded => "SUCCEEDED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Skipped => "SKIPPED",
            TaskStatus::Cached => "CACHED",
        };
        write!(f, "{s}")
    }
}

/// Resource/scheduling configuration frozen at the moment a task is created
/// from its processor's [`Directives`], with per-attempt overrides applied
/// (e.g. a retry's memory/time escalation).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub directives: Directives,
    pub attempt: u32,
}

impl TaskConfig {
    pub fn first_attempt(directives: Directives) -> Self {
        Self {
            directives,
            attempt: 1,
        }
    }

    pub fn next_attempt(&self) -> Self {
        Self {
            directives: self.directives.clone(),
            attempt: self.attempt + 1,
        }
    }
}

/// One concrete invocation of a process: a resolved context, a unique work
/// directory, and whatever the executor/monitor later fill in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRun {
    pub id: TaskId,
    pub index: u64,
    pub processor_id: ProcessorId,
    pub processor_name: String,
    pub run_type: RunType,
    pub status: TaskStatus,
    pub context: TaskContext,
    pub config: TaskConfig,
    pub work_dir: PathBuf,
    pub exit_status: ExitStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<TraceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Content fingerprint once computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,
}

impl TaskRun {
    pub fn new(
        id: TaskId,
        index: u64,
        processor_id: ProcessorId,
        processor_name: impl Into<String>,
        context: TaskContext,
        config: TaskConfig,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            id,
            index,
            processor_id,
            processor_name: processor_name.into(),
            run_type: RunType::Submit,
            status: TaskStatus::New,
            context,
            config,
            work_dir,
            exit_status: ExitStatus::default(),
            trace: None,
            error_message: None,
            fingerprint: None,
        }
    }

    /// Derive the next attempt's `TaskRun`, sharing the `TaskId` lineage but
    /// bumping the attempt counter and switching to [`RunType::Retry`].
    pub fn retry(&self, new_work_dir: PathBuf) -> Self {
        Self {
            id: self.id.clone(),
            index: self.index,
            processor_id: self.processor_id,
            processor_name: self.processor_name.clone(),
            run_type: RunType::Retry,
            status: TaskStatus::New,
            context: self.context.clone(),
            config: self.config.next_attempt(),
            work_dir: new_work_dir,
            exit_status: ExitStatus::default(),
            trace: None,
            error_message: None,
            fingerprint: None,
        }
    }

    pub fn attempt(&self) -> u32 {
        self.config.attempt
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Unique name used in logs and the CLI's task table: `process (index)`.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.processor_name, self.index)
    }
}

/// Builder for `TaskRun` with test defaults.
#[cfg(any(test, feature = "test-support"))]
pub struct TaskRunBuilder {
    id: TaskId,
    index: u64,
    processor_id: ProcessorId,
    processor_name: String,
    context: TaskContext,
    config: TaskConfig,
    work_dir: PathBuf,
    status: TaskStatus,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for TaskRunBuilder {
    fn default() -> Self {
        Self {
            id: TaskId::new("task-1"),
            index: 1,
            processor_id: ProcessorId(1),
            processor_name: "align".to_string(),
            context: TaskContext::new(),
            config: TaskConfig::first_attempt(Directives::default()),
            work_dir: PathBuf::from("/tmp/test/ab/cdef0123456789"),
            status: TaskStatus::New,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl TaskRunBuilder {
    pub fn index(mut self, v: u64) -> Self {
        self.index = v;
        self
    }
    pub fn processor_name(mut self, v: impl Into<String>) -> Self {
        self.processor_name = v.into();
        self
    }
    pub fn context(mut self, v: TaskContext) -> Self {
        self.context = v;
        self
    }
    pub fn status(mut self, v: TaskStatus) -> Self {
        self.status = v;
        self
    }
    pub fn directives(mut self, v: Directives) -> Self {
        self.config = TaskConfig::first_attempt(v);
        self
    }
    pub fn work_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.work_dir = v.into();
        self
    }
    pub fn build(self) -> TaskRun {
        let mut run = TaskRun::new(
            self.id,
            self.index,
            self.processor_id,
            self.processor_name,
            self.context,
            self.config,
            self.work_dir,
        );
        run.status = self.status;
        run
    }
}

#[cfg(any(test, feature = "test-support"))]
impl TaskRun {
    pub fn builder() -> TaskRunBuilder {
        TaskRunBuilder::default()
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
