// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn shell_quote_escapes_single_quotes_and_spaces() {
    assert_eq!(shell_quote("a b"), "a\\ b");
    assert_eq!(shell_quote("it's"), "it\\'s");
    assert_eq!(shell_quote("plain"), "plain");
}

#[test]
fn stage_script_removes_stale_target_then_symlinks() {
    let links = [("/in/reads.fq", "/work/ab/cd/reads.fq")];
    let script = render_stage_script(&links);
    assert_eq!(script, "rm -f /work/ab/cd/reads.fq\nln -s /in/reads.fq /work/ab/cd/reads.fq\n");
}

#[test]
fn unstage_script_prefixes_mkdir_and_suffixes_each_line_with_fallback() {
    let files = [("/work/ab/cd/out.bam", "/results/out.bam")];
    let script = render_unstage_script(CopyStrategy::Copy, Path::new("/results"), &files);
    assert_eq!(
        script,
        "mkdir -p /results\ncp -fR /work/ab/cd/out.bam /results/out.bam || true\n"
    );
}

#[test]
fn move_strategy_uses_mv_command() {
    let files = [("/work/out.txt", "/results/out.txt")];
    let script = render_unstage_script(CopyStrategy::Move, Path::new("/results"), &files);
    assert!(script.contains("mv -f /work/out.txt /results/out.txt || true"));
}

#[test]
fn rsync_strategy_uses_relative_links_flags() {
    let files = [("/work/out.txt", "/results/out.txt")];
    let script = render_unstage_script(CopyStrategy::Rsync, Path::new("/results"), &files);
    assert!(script.contains("rsync -rRl /work/out.txt /results/out.txt || true"));
}

#[test]
fn paths_with_whitespace_are_escaped_in_rendered_scripts() {
    let links = [("/in/my reads.fq", "/work/my reads.fq")];
    let script = render_stage_script(&links);
    assert!(script.contains("my\\ reads.fq"));
}
