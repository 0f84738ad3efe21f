// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide run state

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

crate::define_id! {
    /// 128-bit session identifier, stable across `-resume` attempts.
    pub struct SessionId;
}

impl SessionId {
    /// Allocate a fresh session id from a random UUID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// The first fault recorded against a session; subsequent faults are logged
/// as compact notes only
#[derive(Debug, Clone)]
pub struct TaskFault {
    pub message: String,
    pub processor_name: String,
}

/// Process-wide singleton run state.
///
/// Owns the set of registered [`TaskProcessor`](crate)s only by count —
/// actual ownership of processor state lives in the engine crate, which
/// holds the authoritative list and consults `Session` for the shared
/// abort/fault/error-budget state described here.
pub struct Session {
    pub session_id: SessionId,
    pub run_name: String,
    pub work_dir: PathBuf,
    pub resume_mode: bool,
    pub cacheable: bool,
    aborted: AtomicBool,
    /// Session-wide error counter gating the `maxErrors` budget shared
    /// across all processors (as opposed to a per-processor count).
    error_count: AtomicI64,
    first_fault: Mutex<Option<TaskFault>>,
    active_processors: AtomicI64,
}

impl Session {
    /// `start(commandLine, runName)`: allocate a session id and open the
    /// work directory root. History/cache opening is orchestrated by the
    /// engine crate, which owns those stores.
    pub fn start(run_name: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            session_id: SessionId::generate(),
            run_name: run_name.into(),
            work_dir: work_dir.into(),
            resume_mode: false,
            cacheable: true,
            aborted: AtomicBool::new(false),
            error_count: AtomicI64::new(0),
            first_fault: Mutex::new(None),
            active_processors: AtomicI64::new(0),
        }
    }

    /// `uniqueId` is the same value as `sessionId`; it namespaces the cache.
    pub fn unique_id(&self) -> &str {
        self.session_id.as_str()
    }

    pub fn task_work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    pub fn registered_processor_count(&self) -> i64 {
        self.active_processors.load(Ordering::SeqCst)
    }

    pub fn register_processor(&self) {
        self.active_processors.fetch_add(1, Ordering::SeqCst);
    }

    pub fn deregister_processor(&self) {
        self.active_processors.fetch_sub(1, Ordering::SeqCst);
    }

    /// Increment the session-wide error count and return the new total.
    pub fn record_error(&self) -> i64 {
        self.error_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn error_count(&self) -> i64 {
        self.error_count.load(Ordering::SeqCst)
    }

    /// `abort(err)`: sets the aborted flag. Sending poison to processors and
    /// awaiting quiescence is the engine's job; this only flips the
    /// process-wide flag every component consults.
    pub fn set_aborted(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    /// `fault(taskFault)`: records the first fault; later faults are dropped
    /// (callers should log a compact note instead) and also trigger abort.
    pub fn fault(&self, fault: TaskFault) -> bool {
        let mut guard = self.first_fault.lock();
        let is_first = guard.is_none();
        if is_first {
            *guard = Some(fault);
        }
        self.set_aborted();
        is_first
    }

    pub fn first_fault(&self) -> Option<TaskFault> {
        self.first_fault.lock().clone()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
