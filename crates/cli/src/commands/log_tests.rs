// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn no_selector_returns_none() {
    let dir = tempdir().unwrap();
    let history = HistoryFile::new(dir.path().join(".nextflow.history"));
    history.append("sess-1", "amazing_turing", "nextflow run main.nf").unwrap();
    let args = LogArgs {
        separator: "\t".to_string(),
        fields: None,
        template: None,
        list_fields: false,
        filter: None,
        before: None,
        after: None,
        but: None,
        run: None,
    };
    assert!(resolve_selection(&history, &args).unwrap().is_none());
}

#[test]
fn run_token_resolves_to_a_single_entry() {
    let dir = tempdir().unwrap();
    let history = HistoryFile::new(dir.path().join(".nextflow.history"));
    history.append("sess-1", "amazing_turing", "nextflow run main.nf").unwrap();
    let args = LogArgs {
        separator: "\t".to_string(),
        fields: None,
        template: None,
        list_fields: false,
        filter: None,
        before: None,
        after: None,
        but: None,
        run: Some("amazing_turing".to_string()),
    };
    let selected = resolve_selection(&history, &args).unwrap().unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].run_name, "amazing_turing");
}

#[test]
fn missing_work_dir_leaves_stdout_field_missing() {
    let trace = TraceRecord::new();
    let ctx = RecordContext { trace: &trace, work_dir: None, tail_lines: 100 };
    assert_eq!(ctx.field("stdout"), FieldValue::Missing);
}

#[test]
fn stdout_field_reads_the_command_out_file_under_the_work_dir() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(".command.out"), "line one\nline two\n").unwrap();
    let trace = TraceRecord::new();
    let ctx = RecordContext { trace: &trace, work_dir: Some(dir.path()), tail_lines: 100 };
    assert_eq!(ctx.field("stdout"), FieldValue::Text("line one\nline two".to_string()));
}

#[test]
fn trace_fields_fall_through_to_the_underlying_record() {
    let mut trace = TraceRecord::new();
    trace.set(trace_fields::EXIT, TraceValue::Integer(0));
    let ctx = RecordContext { trace: &trace, work_dir: None, tail_lines: 100 };
    assert_eq!(ctx.field(trace_fields::EXIT), FieldValue::Number(0.0));
    assert_eq!(ctx.field("nonexistent"), FieldValue::Missing);
}
