// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `TaskProcessor` as a multi-input dataflow operator: N data channels plus
//! a control channel, matched tuple-wise into bindings, each binding
//! dispatched to `invokeTask` subject to a `maxForks` concurrency bound.

use rflow_core::{ContextValue, ProcessorConfig};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// Zip N input channels into one channel of matched tuples: the *k*-th
/// message from every channel pairs into the *k*-th tuple. Closes as soon
/// as any channel closes.
pub fn zip_inputs(mut channels: Vec<mpsc::Receiver<ContextValue>>, buffer: usize) -> mpsc::Receiver<Vec<ContextValue>> {
    let (tx, rx) = mpsc::channel(buffer);
    tokio::spawn(async move {
        loop {
            let mut tuple = Vec::with_capacity(channels.len());
            for channel in channels.iter_mut() {
                match channel.recv().await {
                    Some(value) => tuple.push(value),
                    None => return,
                }
            }
            if tx.send(tuple).await.is_err() {
                return;
            }
        }
    });
    rx
}

/// Drive the operator loop for one processor: pull bindings from `bindings`
/// and dispatch each to `invoke`, honoring `config.directives.maxForks` and
/// the termination rule (stop after the first binding iff every input is
/// scalar and none is `each`). Control-channel poison and closed
/// `bindings` both terminate the loop; in-flight invocations are awaited
/// before returning.
pub async fn run_operator<Invoke, Fut>(
    config: &ProcessorConfig,
    mut bindings: mpsc::Receiver<Vec<ContextValue>>,
    mut control: mpsc::Receiver<()>,
    invoke: Invoke,
) where
    Invoke: Fn(Vec<ContextValue>) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let max_forks = config.directives.max_forks.unwrap_or(1).max(1);
    let semaphore = Arc::new(Semaphore::new(max_forks));
    let stop_after_first = config.terminates_after_first_binding();
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            maybe_binding = bindings.recv() => {
                match maybe_binding {
                    Some(values) => {
                        #[allow(clippy::expect_used)]
                        let permit = semaphore.clone().acquire_owned().await.expect("semaphore never closed");
                        let invoke = invoke.clone();
                        in_flight.spawn(async move {
                            invoke(values).await;
                            drop(permit);
                        });
                        if stop_after_first {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = control.recv() => break,
        }
    }

    while in_flight.join_next().await.is_some() {}
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
