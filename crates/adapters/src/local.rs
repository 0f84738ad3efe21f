// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local-process executor: forks a task's `.command.run` driver script
//! under the host OS and tracks its child handle.

use crate::error::ExecutorError;
use crate::executor::{ExecHandle, ExecStatus, Executor, TaskPaths};
use async_trait::async_trait;
use parking_lot::Mutex;
use rflow_core::TaskRun;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::{Child, Command};
use tracing::info;

enum ChildState {
    Running(Child),
    Finished(ExecStatus),
}

/// Drives tasks as plain child processes of the local host.
#[derive(Default, Clone)]
pub struct LocalExecutor {
    children: Arc<Mutex<HashMap<u32, ChildState>>>,
}

impl LocalExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Executor for LocalExecutor {
    async fn submit(&self, task: &TaskRun, paths: &TaskPaths) -> Result<ExecHandle, ExecutorError> {
        let mut cmd = Command::new("/bin/bash");
        cmd.arg(&paths.run_script)
            .current_dir(&paths.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        info!(
            processor = %task.processor_name,
            work_dir = %paths.work_dir.display(),
            "spawning local task"
        );

        let child = cmd.spawn()?;
        let pid = child
            .id()
            .ok_or_else(|| ExecutorError::SubmitFailed("child exited before pid was read".into()))?;

        self.children.lock().insert(pid, ChildState::Running(child));
        Ok(ExecHandle::Pid(pid))
    }

    async fn poll(&self, handle: &ExecHandle) -> Result<ExecStatus, ExecutorError> {
        let ExecHandle::Pid(pid) = handle else {
            return Err(ExecutorError::UnknownHandle(handle.to_string()));
        };

        // try_wait needs &mut Child, so take the entry out while we check it.
        let taken = self.children.lock().remove(pid);
        let Some(state) = taken else {
            return Err(ExecutorError::UnknownHandle(handle.to_string()));
        };

        match state {
            ChildState::Finished(status) => {
                self.children.lock().insert(*pid, ChildState::Finished(status));
                Ok(status)
            }
            ChildState::Running(mut child) => match child.try_wait()? {
                None => {
                    self.children.lock().insert(*pid, ChildState::Running(child));
                    Ok(ExecStatus::Running)
                }
                Some(exit) => {
                    let status = if exit.success() {
                        ExecStatus::Done
                    } else {
                        ExecStatus::Error
                    };
                    self.children.lock().insert(*pid, ChildState::Finished(status));
                    Ok(status)
                }
            },
        }
    }

    async fn kill(&self, handle: &ExecHandle) -> Result<(), ExecutorError> {
        let ExecHandle::Pid(pid) = handle else {
            return Err(ExecutorError::UnknownHandle(handle.to_string()));
        };
        if let Some(ChildState::Running(mut child)) = self.children.lock().remove(pid) {
            child.kill().await?;
            self.children
                .lock()
                .insert(*pid, ChildState::Finished(ExecStatus::Error));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
