// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rflow-core: domain types shared by the dataflow engine, the cache and
//! history stores, the executor adapters, and the CLI.

pub mod clock;
pub mod config;
pub mod context;
pub mod fingerprint;
pub mod id;
pub mod processor;
pub mod session;
pub mod task;
pub mod trace;
pub mod value;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ErrorStrategy, HashMode, RuntimeConfig};
pub use context::TaskContext;
pub use fingerprint::{Fingerprint, FingerprintParseError};
pub use id::{IdGen, MonotonicCounter, SequentialIdGen, ShortId, UuidIdGen};
pub use processor::{
    BindMode, Directives, EntryType, GlobOptions, InputDef, InputKind, OutputDef, OutputSource,
    ProcessorConfig, ProcessorId,
};
pub use session::{Session, SessionId, TaskFault};
pub use task::{ExitStatus, RunType, TaskConfig, TaskId, TaskRun, TaskStatus};
pub use trace::{fields as trace_fields, TraceRecord, TraceValue};
pub use value::ContextValue;
