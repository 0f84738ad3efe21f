// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn exit_status_default_is_unknown() {
    let e = ExitStatus::default();
    assert!(!e.is_known());
    assert_eq!(e, ExitStatus::UNKNOWN);
}

#[test]
fn exit_status_zero_is_success() {
    let e = ExitStatus::new(0);
    assert!(e.is_known());
    assert!(e.is_success());
}

#[test]
fn exit_status_nonzero_is_not_success() {
    let e = ExitStatus::new(1);
    assert!(e.is_known());
    assert!(!e.is_success());
}

#[test]
fn task_status_terminal_set_matches_lifecycle_end_states() {
    assert!(TaskStatus::Succeeded.is_terminal());
    assert!(TaskStatus::Failed.is_terminal());
    assert!(TaskStatus::Skipped.is_terminal());
    assert!(TaskStatus::Cached.is_terminal());
    assert!(!TaskStatus::New.is_terminal());
    assert!(!TaskStatus::Submitted.is_terminal());
    assert!(!TaskStatus::Running.is_terminal());
    assert!(!TaskStatus::Completed.is_terminal());
}

#[test]
fn run_type_display_matches_history_file_convention() {
    assert_eq!(RunType::Submit.to_string(), "SUBMIT");
    assert_eq!(RunType::Retry.to_string(), "RETRY");
}

#[test]
fn task_config_next_attempt_increments_counter_and_keeps_directives() {
    let mut directives = Directives::default();
    directives.max_retries = 3;
    let first = TaskConfig::first_attempt(directives.clone());
    assert_eq!(first.attempt, 1);
    let second = first.next_attempt();
    assert_eq!(second.attempt, 2);
    assert_eq!(second.directives, directives);
}

#[test]
fn new_task_run_starts_as_new_with_unknown_exit_status() {
    let run = TaskRun::builder().build();
    assert_eq!(run.status, TaskStatus::New);
    assert_eq!(run.run_type, RunType::Submit);
    assert!(!run.exit_status.is_known());
    assert_eq!(run.attempt(), 1);
}

#[test]
fn retry_preserves_task_id_lineage_and_bumps_attempt() {
    let first = TaskRun::builder().build();
    let retried = first.retry(PathBuf::from("/tmp/test/ef/9876543210ab"));
    assert_eq!(retried.id, first.id);
    assert_eq!(retried.run_type, RunType::Retry);
    assert_eq!(retried.attempt(), 2);
    assert_eq!(retried.status, TaskStatus::New);
    assert_ne!(retried.work_dir, first.work_dir);
}

#[test]
fn display_name_combines_processor_name_and_index() {
    let run = TaskRun::builder()
        .processor_name("align")
        .index(3)
        .build();
    assert_eq!(run.display_name(), "align (3)");
}

#[test]
fn json_roundtrip_omits_unset_optional_fields() {
    let run = TaskRun::builder().build();
    let json = serde_json::to_string(&run).unwrap();
    assert!(!json.contains("\"trace\""));
    assert!(!json.contains("\"fingerprint\""));
    let back: TaskRun = serde_json::from_str(&json).unwrap();
    assert_eq!(back.id, run.id);
    assert_eq!(back.status, run.status);
}
