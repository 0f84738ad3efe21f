// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::trace_observer::NullObserver;
use rflow_adapters::FakeExecutor;
use rflow_core::{BindMode, InputDef, OutputDef, OutputSource, SequentialIdGen};
use std::time::Duration;
use tempfile::tempdir;

async fn build_runtime(
    work_dir: &std::path::Path,
    cache_dir: &std::path::Path,
    resume: bool,
    grace_ms: u64,
) -> (SessionRuntime, Arc<FakeExecutor>) {
    let mut session = Session::start("run1", work_dir.to_path_buf());
    session.resume_mode = resume;
    let session = Arc::new(session);
    let cache = Arc::new(Cache::open(cache_dir, "run1").await.unwrap());
    let history = Arc::new(HistoryFile::new(cache_dir.join("history")));
    let fake = Arc::new(FakeExecutor::new());
    let runtime = SessionRuntime::new(
        session,
        cache,
        history,
        fake.clone() as Arc<dyn Executor>,
        Arc::new(NullObserver),
        Duration::from_millis(grace_ms),
    )
    .with_id_gen(Arc::new(SequentialIdGen::new("task")));
    (runtime, fake)
}

fn processor_with_value_input(name: &str) -> ProcessorConfig {
    let mut p = ProcessorConfig::new(name);
    p.inputs.push(InputDef::value("sample"));
    p
}

#[tokio::test]
async fn fresh_binding_creates_a_workdir_folder_and_submits() {
    let dir = tempdir().unwrap();
    let (runtime, fake) = build_runtime(&dir.path().join("work"), &dir.path().join("cache"), false, 200).await;
    let processor = processor_with_value_input("align");
    let invocation = Invocation {
        processor: &processor,
        processor_id: ProcessorId(1),
        index: 1,
        values: vec![("sample".to_string(), ContextValue::text("S1"))],
        source_text: "echo hi",
        free_variables: &[],
        success_exit_codes: &[0],
        is_script_task: true,
    };

    let outcome = runtime.invoke_task(invocation).await.unwrap();
    match outcome {
        TaskOutcome::Submitted(run, _handle) => {
            assert!(run.work_dir.exists());
            assert_eq!(fake.submitted.lock().len(), 1);
        }
        _ => panic!("expected Submitted"),
    }
}

#[tokio::test]
async fn guard_referencing_a_missing_context_name_is_a_guard_failure() {
    let dir = tempdir().unwrap();
    let (runtime, _fake) = build_runtime(&dir.path().join("work"), &dir.path().join("cache"), false, 200).await;
    let mut processor = processor_with_value_input("align");
    processor.when_guard = Some("should_run".to_string());

    let invocation = Invocation {
        processor: &processor,
        processor_id: ProcessorId(1),
        index: 1,
        values: vec![("sample".to_string(), ContextValue::text("S1"))],
        source_text: "echo hi",
        free_variables: &[],
        success_exit_codes: &[0],
        is_script_task: true,
    };

    let err = runtime.invoke_task(invocation).await.unwrap_err();
    assert!(matches!(err, EngineError::GuardFailure(_)));
}

#[tokio::test]
async fn false_guard_finalizes_the_task_as_skipped() {
    let dir = tempdir().unwrap();
    let (runtime, _fake) = build_runtime(&dir.path().join("work"), &dir.path().join("cache"), false, 200).await;
    let mut processor = processor_with_value_input("align");
    processor.when_guard = Some("should_run".to_string());

    let invocation = Invocation {
        processor: &processor,
        processor_id: ProcessorId(1),
        index: 1,
        values: vec![
            ("sample".to_string(), ContextValue::text("S1")),
            ("should_run".to_string(), ContextValue::Boolean(false)),
        ],
        source_text: "echo hi",
        free_variables: &[],
        success_exit_codes: &[0],
        is_script_task: true,
    };

    let outcome = runtime.invoke_task(invocation).await.unwrap();
    assert!(matches!(outcome, TaskOutcome::Skipped(_)));
}

#[tokio::test]
async fn second_identical_invocation_in_resume_mode_resumes_from_cache() {
    let dir = tempdir().unwrap();
    let (runtime, _fake) = build_runtime(&dir.path().join("work"), &dir.path().join("cache"), true, 200).await;
    let processor = processor_with_value_input("align");

    let make_invocation = || Invocation {
        processor: &processor,
        processor_id: ProcessorId(1),
        index: 1,
        values: vec![("sample".to_string(), ContextValue::text("S1"))],
        source_text: "echo hi",
        free_variables: &[],
        success_exit_codes: &[0],
        is_script_task: false,
    };

    let first = runtime.invoke_task(make_invocation()).await.unwrap();
    assert!(matches!(first, TaskOutcome::Submitted(..)));

    let second = runtime.invoke_task(make_invocation()).await.unwrap();
    assert!(matches!(second, TaskOutcome::Cached(..)));
}

#[tokio::test]
async fn abort_sets_the_session_aborted_flag_and_poisons_registered_processors() {
    let dir = tempdir().unwrap();
    let (runtime, _fake) = build_runtime(&dir.path().join("work"), &dir.path().join("cache"), false, 50).await;
    let (tx, mut rx) = mpsc::channel(1);
    runtime.register_processor(tx).await;

    runtime.abort("align", "boom").await;

    assert!(runtime.session.is_aborted());
    assert!(rx.try_recv().is_ok());
}

#[tokio::test]
async fn finalize_task_collects_outputs_and_writes_a_cache_entry() {
    let dir = tempdir().unwrap();
    let (runtime, _fake) = build_runtime(&dir.path().join("work"), &dir.path().join("cache"), false, 200).await;
    let mut processor = processor_with_value_input("align");
    processor.outputs.push(OutputDef {
        name: "greeting".to_string(),
        source: OutputSource::Stdout,
        mode: BindMode::Standard,
    });

    let invocation = Invocation {
        processor: &processor,
        processor_id: ProcessorId(1),
        index: 1,
        values: vec![("sample".to_string(), ContextValue::text("S1"))],
        source_text: "echo hi",
        free_variables: &[],
        success_exit_codes: &[0],
        is_script_task: true,
    };
    let outcome = runtime.invoke_task(invocation).await.unwrap();
    let TaskOutcome::Submitted(run, _handle) = outcome else {
        panic!("expected Submitted");
    };
    std::fs::write(run.work_dir.join(".command.out"), "hello\n").unwrap();

    let finalized = runtime.finalize_task(run, &processor, 0, &[0], true).await.unwrap();
    assert_eq!(finalized.status, TaskStatus::Succeeded);
    assert_eq!(
        finalized.context.get("greeting"),
        Some(&ContextValue::Text("hello\n".to_string()))
    );

    let (trace, ctx) = runtime.cache.get_entry(&finalized.fingerprint.unwrap()).unwrap();
    assert_eq!(trace.exit_code(), Some(0));
    assert!(ctx.is_some());
}

#[tokio::test]
async fn finalize_task_marks_failed_on_a_non_success_exit_code() {
    let dir = tempdir().unwrap();
    let (runtime, _fake) = build_runtime(&dir.path().join("work"), &dir.path().join("cache"), false, 200).await;
    let processor = processor_with_value_input("align");

    let invocation = Invocation {
        processor: &processor,
        processor_id: ProcessorId(1),
        index: 1,
        values: vec![("sample".to_string(), ContextValue::text("S1"))],
        source_text: "echo hi",
        free_variables: &[],
        success_exit_codes: &[0],
        is_script_task: true,
    };
    let outcome = runtime.invoke_task(invocation).await.unwrap();
    let TaskOutcome::Submitted(run, _handle) = outcome else {
        panic!("expected Submitted");
    };

    let finalized = runtime.finalize_task(run, &processor, 1, &[0], true).await.unwrap();
    assert_eq!(finalized.status, TaskStatus::Failed);
}
