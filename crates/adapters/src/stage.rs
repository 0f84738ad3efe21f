// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage/unstage script rendering: symlinking declared inputs into a task's
//! working directory before submission, and copying/moving/rsyncing
//! collected outputs back out of it afterward.

use std::path::Path;

/// How collected outputs are moved from a task's working directory back to
/// the publish target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStrategy {
    Copy,
    Move,
    Rsync,
}

impl CopyStrategy {
    fn command_template(&self) -> &'static str {
        match self {
            CopyStrategy::Copy => "cp -fR",
            CopyStrategy::Move => "mv -f",
            CopyStrategy::Rsync => "rsync -rRl",
        }
    }
}

/// Escape a path for embedding, unquoted, in a generated shell script:
/// every single quote or whitespace character is backslash-escaped.
pub fn shell_quote(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    for ch in word.chars() {
        if ch == '\'' || ch.is_whitespace() {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Render the stage script: symlinks each `(source, target)` pair into the
/// working directory, removing any stale target first.
pub fn render_stage_script<P: AsRef<Path>>(links: &[(P, P)]) -> String {
    let mut script = String::new();
    for (src, target) in links {
        let src = shell_quote(&src.as_ref().to_string_lossy());
        let target = shell_quote(&target.as_ref().to_string_lossy());
        script.push_str(&format!("rm -f {target}\n"));
        script.push_str(&format!("ln -s {src} {target}\n"));
    }
    script
}

/// Render the unstage script: copies/moves/rsyncs each `(source, target)`
/// pair out of the working directory, tolerating outputs missing from a
/// failed task's tail.
pub fn render_unstage_script<P: AsRef<Path>>(
    strategy: CopyStrategy,
    target_dir: &Path,
    files: &[(P, P)],
) -> String {
    let mut script = format!("mkdir -p {}\n", shell_quote(&target_dir.to_string_lossy()));
    let cmd = strategy.command_template();
    for (src, target) in files {
        let src = shell_quote(&src.as_ref().to_string_lossy());
        let target = shell_quote(&target.as_ref().to_string_lossy());
        script.push_str(&format!("{cmd} {src} {target} || true\n"));
    }
    script
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
