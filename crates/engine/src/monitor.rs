// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background executor-poll scheduler: periodically asks every in-flight
//! executor handle for its status and dispatches completion events back to
//! the originating processor.

use parking_lot::Mutex;
use rflow_adapters::{ExecHandle, ExecStatus, Executor};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// A handle reaching a terminal status, reported back to its owner.
#[derive(Debug, Clone)]
pub struct CompletionEvent {
    pub handle: ExecHandle,
    pub status: ExecStatus,
}

/// Polls all watched handles on a fixed interval.
pub struct Monitor {
    executor: Arc<dyn Executor>,
    watched: Mutex<Vec<ExecHandle>>,
    tx: mpsc::Sender<CompletionEvent>,
}

impl Monitor {
    pub fn new(executor: Arc<dyn Executor>, tx: mpsc::Sender<CompletionEvent>) -> Self {
        Self {
            executor,
            watched: Mutex::new(Vec::new()),
            tx,
        }
    }

    pub fn watch(&self, handle: ExecHandle) {
        self.watched.lock().push(handle);
    }

    pub fn watched_count(&self) -> usize {
        self.watched.lock().len()
    }

    /// Poll every watched handle once. Handles reaching `Done`/`Error` are
    /// removed and reported; everything else stays watched for next tick.
    pub async fn tick(&self) {
        let handles: Vec<ExecHandle> = self.watched.lock().clone();
        let mut remaining = Vec::with_capacity(handles.len());

        for handle in handles {
            let span = tracing::info_span!("monitor_poll", handle = %handle);
            let _guard = span.enter();
            let start = std::time::Instant::now();

            match self.executor.poll(&handle).await {
                Ok(status @ (ExecStatus::Done | ExecStatus::Error)) => {
                    info!(
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        %status,
                        "task reached terminal status"
                    );
                    if self.tx.send(CompletionEvent { handle, status }).await.is_err() {
                        return;
                    }
                }
                Ok(status) => {
                    debug!(elapsed_ms = start.elapsed().as_millis() as u64, %status, "still in flight");
                    remaining.push(handle);
                }
                Err(error) => {
                    warn!(%error, "poll failed, retrying next tick");
                    remaining.push(handle);
                }
            }
        }

        *self.watched.lock() = remaining;
    }

    /// Run `tick` on `interval` until `shutdown` fires.
    pub async fn run(self: Arc<Self>, interval: Duration, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                _ = &mut shutdown => return,
            }
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
