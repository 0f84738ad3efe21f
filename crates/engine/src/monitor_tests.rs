// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use rflow_adapters::FakeExecutor;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test]
async fn tick_reports_completion_for_terminal_handles_and_keeps_watching_running_ones() {
    let fake = Arc::new(FakeExecutor::new());
    let done_handle = ExecHandle::Pid(1);
    let running_handle = ExecHandle::Pid(2);
    fake.set_status(done_handle.clone(), ExecStatus::Done);
    fake.set_status(running_handle.clone(), ExecStatus::Running);

    let (tx, mut rx) = mpsc::channel(4);
    let monitor = Monitor::new(fake, tx);
    monitor.watch(done_handle.clone());
    monitor.watch(running_handle.clone());

    monitor.tick().await;

    let event = rx.try_recv().unwrap();
    assert_eq!(event.handle, done_handle);
    assert_eq!(event.status, ExecStatus::Done);
    assert!(rx.try_recv().is_err());
    assert_eq!(monitor.watched_count(), 1);
}

#[tokio::test]
async fn unknown_handle_poll_errors_keep_the_handle_watched() {
    let fake = Arc::new(FakeExecutor::new());
    let mystery = ExecHandle::Pid(99);
    let (tx, _rx) = mpsc::channel(4);
    let monitor = Monitor::new(fake, tx);
    monitor.watch(mystery);

    monitor.tick().await;
    assert_eq!(monitor.watched_count(), 1);
}

#[tokio::test]
async fn run_stops_when_shutdown_fires() {
    let fake = Arc::new(FakeExecutor::new());
    let (tx, _rx) = mpsc::channel(4);
    let monitor = Arc::new(Monitor::new(fake, tx));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = tokio::spawn(monitor.run(Duration::from_millis(10), shutdown_rx));
    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
}
