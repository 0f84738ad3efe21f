// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rflow_core::TaskRun;
use std::time::Duration;
use tempfile::tempdir;

fn write_run_script(dir: &std::path::Path, body: &str) -> TaskPaths {
    let paths = TaskPaths::for_work_dir(dir);
    std::fs::write(&paths.run_script, format!("#!/bin/bash\n{body}\n")).unwrap();
    paths
}

#[tokio::test]
async fn submit_then_poll_reports_done_on_success() {
    let dir = tempdir().unwrap();
    let paths = write_run_script(dir.path(), "exit 0");
    let exec = LocalExecutor::new();
    let task = TaskRun::builder().build();

    let handle = exec.submit(&task, &paths).await.unwrap();

    let mut status = exec.poll(&handle).await.unwrap();
    for _ in 0..50 {
        if status != ExecStatus::Running {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        status = exec.poll(&handle).await.unwrap();
    }
    assert_eq!(status, ExecStatus::Done);
}

#[tokio::test]
async fn submit_then_poll_reports_error_on_nonzero_exit() {
    let dir = tempdir().unwrap();
    let paths = write_run_script(dir.path(), "exit 7");
    let exec = LocalExecutor::new();
    let task = TaskRun::builder().build();

    let handle = exec.submit(&task, &paths).await.unwrap();

    let mut status = exec.poll(&handle).await.unwrap();
    for _ in 0..50 {
        if status != ExecStatus::Running {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        status = exec.poll(&handle).await.unwrap();
    }
    assert_eq!(status, ExecStatus::Error);
}

#[tokio::test]
async fn kill_terminates_a_running_task() {
    let dir = tempdir().unwrap();
    let paths = write_run_script(dir.path(), "sleep 30");
    let exec = LocalExecutor::new();
    let task = TaskRun::builder().build();

    let handle = exec.submit(&task, &paths).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    exec.kill(&handle).await.unwrap();

    assert_eq!(exec.poll(&handle).await.unwrap(), ExecStatus::Error);
}

#[tokio::test]
async fn poll_on_unsubmitted_handle_errors() {
    let exec = LocalExecutor::new();
    let err = exec.poll(&ExecHandle::Pid(999999)).await.unwrap_err();
    assert!(matches!(err, ExecutorError::UnknownHandle(_)));
}
