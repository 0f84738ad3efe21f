// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires a `Session` to its `Cache`, `HistoryFile`, and `Executor`, and
//! implements `invokeTask`'s seven-step sequence plus session-wide
//! abort/fault/quiescence.

use crate::cache_probe::{self, ProbeResult, WorkDirLock};
use crate::error::EngineError;
use crate::fingerprint::{self, DeclaredInput, FingerprintInputs};
use crate::output_collect;
use crate::trace_observer::TraceObserver;
use rflow_adapters::{Executor, TaskPaths};
use rflow_core::{
    trace_fields, ContextValue, ExitStatus, IdGen, ProcessorConfig, ProcessorId, Session,
    TaskConfig, TaskContext, TaskFault, TaskId, TaskRun, TaskStatus, TraceRecord, TraceValue,
    UuidIdGen,
};
use rflow_storage::{Cache, HistoryFile};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tracing::warn;

/// Inputs resolved for one `invokeTask` call. Task-body compilation (source
/// text, free-variable extraction) is the job of an embedding DSL layer;
/// this crate only consumes its output.
pub struct Invocation<'a> {
    pub processor: &'a ProcessorConfig,
    pub processor_id: ProcessorId,
    pub index: u64,
    pub values: Vec<(String, ContextValue)>,
    pub source_text: &'a str,
    pub free_variables: &'a [(String, ContextValue)],
    pub success_exit_codes: &'a [i32],
    pub is_script_task: bool,
}

pub enum TaskOutcome {
    Skipped(TaskRun),
    Cached(TaskRun),
    Submitted(TaskRun, rflow_adapters::ExecHandle),
}

/// Process-wide singleton run state plus the stores and backend it drives.
pub struct SessionRuntime {
    pub session: Arc<Session>,
    pub cache: Arc<Cache>,
    pub history: Arc<HistoryFile>,
    pub executor: Arc<dyn Executor>,
    pub observer: Arc<dyn TraceObserver>,
    pub work_dir_lock: WorkDirLock,
    pub abort_grace_period: Duration,
    id_gen: Arc<dyn IdGen>,
    control_senders: AsyncMutex<Vec<mpsc::Sender<()>>>,
}

impl SessionRuntime {
    pub fn new(
        session: Arc<Session>,
        cache: Arc<Cache>,
        history: Arc<HistoryFile>,
        executor: Arc<dyn Executor>,
        observer: Arc<dyn TraceObserver>,
        abort_grace_period: Duration,
    ) -> Self {
        Self {
            session,
            cache,
            history,
            executor,
            observer,
            work_dir_lock: WorkDirLock::new(),
            abort_grace_period,
            id_gen: Arc::new(UuidIdGen),
            control_senders: AsyncMutex::new(Vec::new()),
        }
    }

    /// Override the task id generator (tests use a deterministic one).
    pub fn with_id_gen(mut self, id_gen: Arc<dyn IdGen>) -> Self {
        self.id_gen = id_gen;
        self
    }

    /// Register a processor's control channel so `abort` can poison it.
    pub async fn register_processor(&self, control_tx: mpsc::Sender<()>) {
        self.session.register_processor();
        self.control_senders.lock().await.push(control_tx);
    }

    pub fn deregister_processor(&self) {
        self.session.deregister_processor();
    }

    /// `abort(err)`: records the first fault, sends poison to every
    /// registered processor, then waits up to `abort_grace_period` for them
    /// to quiesce.
    pub async fn abort(&self, processor_name: impl Into<String>, message: impl Into<String>) {
        let is_first = self.session.fault(TaskFault {
            message: message.into(),
            processor_name: processor_name.into(),
        });
        if !is_first {
            return;
        }
        let senders = self.control_senders.lock().await.clone();
        for tx in &senders {
            let _ = tx.send(()).await;
        }
        self.await_quiescence().await;
    }

    async fn await_quiescence(&self) {
        let deadline = tokio::time::Instant::now() + self.abort_grace_period;
        while self.session.registered_processor_count() > 0 {
            if tokio::time::Instant::now() >= deadline {
                warn!("abort grace period elapsed with processors still active; forcing shutdown");
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// `invokeTask`: resolve context, evaluate the guard and `storeDir`
    /// short-circuit, fingerprint, and either resume from cache or submit.
    pub async fn invoke_task(&self, invocation: Invocation<'_>) -> Result<TaskOutcome, EngineError> {
        let id = TaskId::new(self.id_gen.next());
        let mut context = TaskContext::new();
        for (name, value) in &invocation.values {
            context.insert(name.clone(), value.clone());
        }

        let mut run = TaskRun::new(
            id,
            invocation.index,
            invocation.processor_id,
            invocation.processor.name.clone(),
            context.clone(),
            TaskConfig::first_attempt(invocation.processor.directives.clone()),
            PathBuf::new(),
        );

        if let Some(guard_name) = &invocation.processor.when_guard {
            match context.get(guard_name) {
                None => return Err(EngineError::GuardFailure(guard_name.clone())),
                Some(ContextValue::Boolean(false)) => {
                    run.status = TaskStatus::Skipped;
                    self.observer.on_complete(&run);
                    return Ok(TaskOutcome::Skipped(run));
                }
                _ => {}
            }
        }

        if let Some(store_dir) = &invocation.processor.store_dir {
            if cache_probe::check_cached_output(
                store_dir,
                &invocation.processor.outputs,
                &[],
                invocation.is_script_task,
                invocation.success_exit_codes,
                None,
            ) {
                run.work_dir = store_dir.clone();
                run.status = TaskStatus::Cached;
                self.observer.on_complete(&run);
                return Ok(TaskOutcome::Cached(run));
            }
        }

        let declared_inputs: Vec<DeclaredInput<'_>> = invocation
            .processor
            .inputs
            .iter()
            .map(|def| {
                #[allow(clippy::expect_used)]
                let value = context.get(&def.name).expect("every declared input was bound above");
                DeclaredInput { def, value }
            })
            .collect();

        let fp_inputs = FingerprintInputs {
            session_unique_id: self.session.unique_id(),
            processor_name: &invocation.processor.name,
            source_text: invocation.source_text,
            declared_inputs: &declared_inputs,
            free_variables: invocation.free_variables,
            hash_mode: invocation.processor.hash_mode,
        };
        let hash = fingerprint::compute_fingerprint(&fp_inputs)?;

        let should_try_cache = self.session.resume_mode && self.session.cacheable;
        let outputs = &invocation.processor.outputs;
        let success_codes = invocation.success_exit_codes;
        let is_script = invocation.is_script_task;
        let cache = &self.cache;

        let probe = cache_probe::probe_and_resolve_folder(
            &self.work_dir_lock,
            &self.session.work_dir,
            hash,
            should_try_cache,
            |probe_hash, folder| {
                let cached_context = cache.get_entry(probe_hash).and_then(|(_, ctx)| ctx);
                cache_probe::check_cached_output(folder, outputs, &[], is_script, success_codes, cached_context.as_ref())
            },
        )?;

        match probe {
            ProbeResult::Resumed { hash, folder } => {
                run.work_dir = folder;
                run.fingerprint = Some(hash);
                run.status = TaskStatus::Cached;
                self.cache.inc_entry(hash).await?;
                self.cache.write_index(&hash, true)?;
                self.observer.on_complete(&run);
                Ok(TaskOutcome::Cached(run))
            }
            ProbeResult::Submitted { hash, folder } => {
                run.work_dir = folder.clone();
                run.fingerprint = Some(hash);
                run.status = TaskStatus::Submitted;
                let paths = TaskPaths::for_work_dir(folder);
                let handle = self.executor.submit(&run, &paths).await?;
                Ok(TaskOutcome::Submitted(run, handle))
            }
        }
    }

    /// Collect a submitted task's outputs once its executor handle has
    /// reported a terminal status, and, on success, persist the result into
    /// the cache.
    pub async fn finalize_task(
        &self,
        mut run: TaskRun,
        processor: &ProcessorConfig,
        exit_code: i32,
        success_exit_codes: &[i32],
        is_script_task: bool,
    ) -> Result<TaskRun, EngineError> {
        run.exit_status = ExitStatus::new(exit_code);

        if is_script_task && !success_exit_codes.contains(&exit_code) {
            run.status = TaskStatus::Failed;
            run.error_message = Some(format!("process exited with status {exit_code}"));
            self.observer.on_complete(&run);
            return Ok(run);
        }

        let stdout_path = run.work_dir.join(".command.out");
        match output_collect::collect_outputs(&run.work_dir, &processor.outputs, &[], &stdout_path, is_script_task, &run.context) {
            Ok(collected) => {
                for output in &collected {
                    if let Some(first) = output.bindings.first() {
                        run.context.insert(output.name.clone(), first.clone());
                    }
                }
                run.status = TaskStatus::Succeeded;
                if let Some(hash) = run.fingerprint {
                    let mut trace = TraceRecord::new();
                    trace.set(trace_fields::EXIT, TraceValue::Integer(exit_code as i64));
                    trace.set(trace_fields::FOLDER, TraceValue::Path(run.work_dir.clone()));
                    self.cache.put_entry(hash, trace, Some(run.context.clone())).await?;
                    self.cache.write_index(&hash, false)?;
                }
                self.observer.on_complete(&run);
                Ok(run)
            }
            Err(e) => {
                run.status = TaskStatus::Failed;
                run.error_message = Some(e.to_string());
                self.observer.on_complete(&run);
                Ok(run)
            }
        }
    }
}

#[cfg(test)]
#[path = "session_runtime_tests.rs"]
mod tests;
