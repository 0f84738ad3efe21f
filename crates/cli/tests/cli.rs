// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box specs for the `rflow` binary: invoke it and check stdout,
//! stderr, and exit codes against a fixture base directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use std::fs;

fn rflow() -> Command {
    Command::cargo_bin("rflow").unwrap()
}

#[test]
fn history_on_an_empty_base_dir_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = rflow().current_dir(dir.path()).arg("history").output().unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn history_lists_an_appended_run() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".nextflow.history"),
        "2026-01-01T00:00:00Z\tamazing_turing\tsess-1\tnextflow run main.nf\n",
    )
    .unwrap();
    let output = rflow().current_dir(dir.path()).arg("history").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("amazing_turing"));
}

#[test]
fn clean_without_dry_run_or_force_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let output = rflow().current_dir(dir.path()).arg("clean").output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("dry run"));
}

#[test]
fn log_list_fields_prints_the_known_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let output = rflow().current_dir(dir.path()).args(["log", "-l"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("folder"));
}
