// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classifies a task failure and decides what the owning processor does
//! about it.

use rflow_core::ErrorStrategy;

/// The kind of failure a task run encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// User script failed to compile/parse. Always terminal.
    NotRecoverable,
    /// Non-zero exit or explicit failure. Honors the configured strategy.
    ProcessFailed,
    /// A declared output was not collectible. Honors the configured strategy.
    MissingOutput,
    /// A declared value output referenced an unknown name. Honors the
    /// configured strategy.
    MissingValue,
    /// Infrastructure error (I/O, scheduler lost). Always terminal.
    Abort,
    /// Exception while evaluating a `when` guard. Terminal for the task,
    /// but does not terminate the processor.
    GuardFailure,
}

impl FailureKind {
    fn is_always_terminal(self) -> bool {
        matches!(self, FailureKind::NotRecoverable | FailureKind::Abort)
    }
}

/// What the processor should do in response to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Record a session-wide fault and begin abort.
    FaultSession,
    /// Mark this task failed, let in-flight siblings finish, then quiesce.
    FinishAndQuiesce,
    /// Log and move on; the processor keeps running.
    Ignore,
    /// Fail this task outright (guard evaluation failures, which do not
    /// propagate to the processor or session).
    FailTaskOnly,
    /// Requeue with a fresh attempt.
    Retry,
}

/// Decide the action for one failure, given the processor's configured
/// strategy, the task's current attempt number and its process's
/// `maxRetries`, and the session's running error count against `maxErrors`
/// (`-1` meaning unbounded).
pub fn classify(
    kind: FailureKind,
    strategy: ErrorStrategy,
    attempt: u32,
    max_retries: u32,
    session_error_count: i64,
    max_errors: i64,
) -> Action {
    if kind == FailureKind::GuardFailure {
        return Action::FailTaskOnly;
    }
    if kind.is_always_terminal() {
        return Action::FaultSession;
    }

    match strategy {
        ErrorStrategy::Terminate => Action::FaultSession,
        ErrorStrategy::Finish => Action::FinishAndQuiesce,
        ErrorStrategy::Ignore => Action::Ignore,
        ErrorStrategy::Retry => {
            let retries_exhausted = attempt > max_retries;
            let budget_exhausted = max_errors >= 0 && session_error_count > max_errors;
            if retries_exhausted || budget_exhausted {
                Action::FaultSession
            } else {
                Action::Retry
            }
        }
    }
}

#[cfg(test)]
#[path = "error_strategy_tests.rs"]
mod tests;
