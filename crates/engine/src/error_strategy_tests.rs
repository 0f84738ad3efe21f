// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn not_recoverable_and_abort_are_terminal_regardless_of_strategy() {
    for strategy in [
        ErrorStrategy::Terminate,
        ErrorStrategy::Finish,
        ErrorStrategy::Ignore,
        ErrorStrategy::Retry,
    ] {
        assert_eq!(
            classify(FailureKind::NotRecoverable, strategy, 1, 3, 0, -1),
            Action::FaultSession
        );
        assert_eq!(
            classify(FailureKind::Abort, strategy, 1, 3, 0, -1),
            Action::FaultSession
        );
    }
}

#[test]
fn guard_failure_only_fails_the_task() {
    assert_eq!(
        classify(FailureKind::GuardFailure, ErrorStrategy::Retry, 1, 3, 0, -1),
        Action::FailTaskOnly
    );
}

#[test]
fn terminate_strategy_faults_the_session_on_process_failure() {
    assert_eq!(
        classify(FailureKind::ProcessFailed, ErrorStrategy::Terminate, 1, 3, 0, -1),
        Action::FaultSession
    );
}

#[test]
fn finish_strategy_quiesces_without_faulting() {
    assert_eq!(
        classify(FailureKind::MissingOutput, ErrorStrategy::Finish, 1, 3, 0, -1),
        Action::FinishAndQuiesce
    );
}

#[test]
fn ignore_strategy_continues() {
    assert_eq!(
        classify(FailureKind::MissingValue, ErrorStrategy::Ignore, 1, 3, 0, -1),
        Action::Ignore
    );
}

#[test]
fn retry_strategy_retries_until_max_retries_exhausted() {
    assert_eq!(
        classify(FailureKind::ProcessFailed, ErrorStrategy::Retry, 1, 3, 0, -1),
        Action::Retry
    );
    assert_eq!(
        classify(FailureKind::ProcessFailed, ErrorStrategy::Retry, 4, 3, 0, -1),
        Action::FaultSession
    );
}

#[test]
fn retry_strategy_gives_up_when_error_budget_is_exhausted() {
    assert_eq!(
        classify(FailureKind::ProcessFailed, ErrorStrategy::Retry, 1, 10, 5, 5),
        Action::FaultSession
    );
    assert_eq!(
        classify(FailureKind::ProcessFailed, ErrorStrategy::Retry, 1, 10, 4, 5),
        Action::Retry
    );
}

#[test]
fn retry_strategy_is_unbounded_when_max_errors_is_negative() {
    assert_eq!(
        classify(FailureKind::ProcessFailed, ErrorStrategy::Retry, 1, 10, 1_000_000, -1),
        Action::Retry
    );
}
