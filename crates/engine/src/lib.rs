// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

//! rflow-engine: the dataflow operator, cache-probe/submit lifecycle, and
//! session runtime that turn a set of declared processors into running
//! tasks.

mod cache_probe;
mod error;
mod error_strategy;
mod fingerprint;
mod forwarding;
mod glob_walk;
mod monitor;
mod output_collect;
mod processor;
mod session_runtime;
mod trace_observer;
mod wildcard;

pub use cache_probe::{check_cached_output, folder_for, probe_and_resolve_folder, ProbeResult, WorkDirLock};
pub use error::EngineError;
pub use error_strategy::{classify, Action, FailureKind};
pub use fingerprint::{compute_fingerprint, rehash, DeclaredInput, FingerprintInputs};
pub use forwarding::expand_each;
pub use glob_walk::{collect_glob, exclude_staged_inputs, is_glob_pattern, resolve_direct};
pub use monitor::{CompletionEvent, Monitor};
pub use output_collect::{collect_outputs, CollectedOutput};
pub use processor::{run_operator, zip_inputs};
pub use session_runtime::{Invocation, SessionRuntime, TaskOutcome};
pub use trace_observer::{ChannelObserver, NullObserver, TraceObserver};
pub use wildcard::expand_names;
