// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification hook invoked whenever a task reaches a terminal status.

use rflow_core::TaskRun;

/// Implemented by anything that wants to observe task completions —
/// the CLI's live task table, a trace-file writer, or tests.
pub trait TraceObserver: Send + Sync {
    fn on_complete(&self, task: &TaskRun);
}

/// Observer that does nothing; the default for sessions that don't need one.
#[derive(Default)]
pub struct NullObserver;

impl TraceObserver for NullObserver {
    fn on_complete(&self, _task: &TaskRun) {}
}

/// Forwards each completed task onto an unbounded channel.
pub struct ChannelObserver {
    tx: tokio::sync::mpsc::UnboundedSender<TaskRun>,
}

impl ChannelObserver {
    pub fn new(tx: tokio::sync::mpsc::UnboundedSender<TaskRun>) -> Self {
        Self { tx }
    }
}

impl TraceObserver for ChannelObserver {
    fn on_complete(&self, task: &TaskRun) {
        let _ = self.tx.send(task.clone());
    }
}

#[cfg(test)]
#[path = "trace_observer_tests.rs"]
mod tests;
