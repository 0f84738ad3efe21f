// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The common executor interface implemented by the local-process and grid
//! backends.

use crate::error::ExecutorError;
use async_trait::async_trait;
use rflow_core::TaskRun;
use std::fmt;
use std::path::PathBuf;

/// Common status enum every backend's native states are mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    Pending,
    Running,
    Done,
    Error,
    Hold,
}

impl fmt::Display for ExecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecStatus::Pending => "PENDING",
            ExecStatus::Running => "RUNNING",
            ExecStatus::Done => "DONE",
            ExecStatus::Error => "ERROR",
            ExecStatus::Hold => "HOLD",
        };
        write!(f, "{s}")
    }
}

/// Opaque handle an executor assigns a submitted task: a local PID or a
/// grid scheduler job id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExecHandle {
    Pid(u32),
    JobId(String),
}

impl fmt::Display for ExecHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecHandle::Pid(pid) => write!(f, "{pid}"),
            ExecHandle::JobId(id) => write!(f, "{id}"),
        }
    }
}

/// Resolved paths for a task's working directory, used by both the local
/// and grid backends when staging and collecting a run.
#[derive(Debug, Clone)]
pub struct TaskPaths {
    pub work_dir: PathBuf,
    pub run_script: PathBuf,
    pub user_script: PathBuf,
    pub stdout: PathBuf,
    pub stderr: PathBuf,
    pub merged_log: PathBuf,
    pub env_dump: PathBuf,
    pub exit_code: PathBuf,
}

impl TaskPaths {
    pub fn for_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        Self {
            run_script: work_dir.join(".command.run"),
            user_script: work_dir.join(".command.sh"),
            stdout: work_dir.join(".command.out"),
            stderr: work_dir.join(".command.err"),
            merged_log: work_dir.join(".command.log"),
            env_dump: work_dir.join(".command.env"),
            exit_code: work_dir.join(".exitcode"),
            work_dir,
        }
    }
}

/// Backend that submits, polls, and kills task runs.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn submit(&self, task: &TaskRun, paths: &TaskPaths) -> Result<ExecHandle, ExecutorError>;

    async fn poll(&self, handle: &ExecHandle) -> Result<ExecStatus, ExecutorError>;

    async fn kill(&self, handle: &ExecHandle) -> Result<(), ExecutorError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// In-memory executor for engine tests: records submissions and lets
    /// the test script every handle's status.
    #[derive(Default)]
    pub struct FakeExecutor {
        pub submitted: Mutex<Vec<ExecHandle>>,
        pub statuses: Mutex<HashMap<ExecHandle, ExecStatus>>,
        pub killed: Mutex<Vec<ExecHandle>>,
        next_pid: Mutex<u32>,
    }

    impl FakeExecutor {
        pub fn new() -> Self {
            Self {
                next_pid: Mutex::new(1000),
                ..Default::default()
            }
        }

        pub fn set_status(&self, handle: ExecHandle, status: ExecStatus) {
            self.statuses.lock().insert(handle, status);
        }
    }

    #[async_trait]
    impl Executor for FakeExecutor {
        async fn submit(
            &self,
            _task: &TaskRun,
            _paths: &TaskPaths,
        ) -> Result<ExecHandle, ExecutorError> {
            let mut next = self.next_pid.lock();
            let handle = ExecHandle::Pid(*next);
            *next += 1;
            self.submitted.lock().push(handle.clone());
            self.statuses.lock().insert(handle.clone(), ExecStatus::Pending);
            Ok(handle)
        }

        async fn poll(&self, handle: &ExecHandle) -> Result<ExecStatus, ExecutorError> {
            self.statuses
                .lock()
                .get(handle)
                .copied()
                .ok_or_else(|| ExecutorError::UnknownHandle(handle.to_string()))
        }

        async fn kill(&self, handle: &ExecHandle) -> Result<(), ExecutorError> {
            self.killed.lock().push(handle.clone());
            self.statuses.lock().insert(handle.clone(), ExecStatus::Error);
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
