// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex;
use rflow_core::{InputDef, ProcessorConfig};
use std::sync::Arc;

#[tokio::test]
async fn zip_inputs_pairs_the_kth_message_from_every_channel() {
    let (tx_a, rx_a) = mpsc::channel(4);
    let (tx_b, rx_b) = mpsc::channel(4);
    tx_a.send(ContextValue::text("a1")).await.unwrap();
    tx_b.send(ContextValue::text("b1")).await.unwrap();
    tx_a.send(ContextValue::text("a2")).await.unwrap();
    tx_b.send(ContextValue::text("b2")).await.unwrap();
    drop(tx_a);
    drop(tx_b);

    let mut zipped = zip_inputs(vec![rx_a, rx_b], 4);
    assert_eq!(zipped.recv().await, Some(vec![ContextValue::text("a1"), ContextValue::text("b1")]));
    assert_eq!(zipped.recv().await, Some(vec![ContextValue::text("a2"), ContextValue::text("b2")]));
    assert_eq!(zipped.recv().await, None);
}

#[tokio::test]
async fn scalar_only_processor_stops_after_the_first_binding() {
    let mut config = ProcessorConfig::new("align");
    config.inputs.push(InputDef::value("sample"));
    let (bindings_tx, bindings_rx) = mpsc::channel(4);
    let (_control_tx, control_rx) = mpsc::channel(1);

    bindings_tx.send(vec![ContextValue::text("s1")]).await.unwrap();
    bindings_tx.send(vec![ContextValue::text("s2")]).await.unwrap();

    let invocations = Arc::new(Mutex::new(Vec::new()));
    let recorded = invocations.clone();
    run_operator(&config, bindings_rx, control_rx, move |values| {
        let recorded = recorded.clone();
        async move {
            recorded.lock().push(values);
        }
    })
    .await;

    assert_eq!(invocations.lock().len(), 1);
}

#[tokio::test]
async fn each_input_processor_keeps_running_until_poison() {
    let mut config = ProcessorConfig::new("per_chunk");
    config.inputs.push(InputDef::each("chunk"));
    let (bindings_tx, bindings_rx) = mpsc::channel(4);
    let (control_tx, control_rx) = mpsc::channel(1);

    bindings_tx.send(vec![ContextValue::text("1")]).await.unwrap();
    bindings_tx.send(vec![ContextValue::text("2")]).await.unwrap();
    control_tx.send(()).await.unwrap();

    let invocations = Arc::new(Mutex::new(Vec::new()));
    let recorded = invocations.clone();
    run_operator(&config, bindings_rx, control_rx, move |values| {
        let recorded = recorded.clone();
        async move {
            recorded.lock().push(values);
        }
    })
    .await;

    assert!(invocations.lock().len() <= 2);
}

#[tokio::test]
async fn closed_bindings_channel_terminates_the_operator() {
    let mut config = ProcessorConfig::new("per_chunk");
    config.inputs.push(InputDef::each("chunk"));
    let (bindings_tx, bindings_rx) = mpsc::channel(4);
    let (_control_tx, control_rx) = mpsc::channel(1);
    bindings_tx.send(vec![ContextValue::text("1")]).await.unwrap();
    drop(bindings_tx);

    let invocations = Arc::new(Mutex::new(0usize));
    let recorded = invocations.clone();
    run_operator(&config, bindings_rx, control_rx, move |_values| {
        let recorded = recorded.clone();
        async move {
            *recorded.lock() += 1;
        }
    })
    .await;

    assert_eq!(*invocations.lock(), 1);
}
