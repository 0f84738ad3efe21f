// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output file collection: resolves a declared `file(pattern)` output
//! against a task's working directory, walking it when the pattern
//! contains glob metacharacters.

use regex::Regex;
use rflow_core::{EntryType, GlobOptions};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// `true` iff `pattern` needs directory walking rather than direct
/// resolution (contains `*`, `?`, or a `[...]` class).
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}

/// Translate a shell glob (`*`, `?`, `[...]`) into an anchored regex. `**`
/// matches across path separators; a lone `*` does not.
fn glob_to_regex(pattern: &str) -> Regex {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        out.push_str("(?:.*/)?");
                    } else {
                        out.push_str(".*");
                    }
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            '.' | '(' | ')' | '+' | '|' | '^' | '$' => {
                out.push('\\');
                out.push(c);
            }
            '[' => out.push('['),
            ']' => out.push(']'),
            other => out.push(other),
        }
    }
    out.push('$');
    #[allow(clippy::expect_used)]
    Regex::new(&out).expect("translated glob pattern is always a valid regex")
}

/// Collect files under `work_dir` matching `pattern`, honoring the
/// declared glob options. Paths are returned relative to `work_dir`.
pub fn collect_glob(work_dir: &Path, pattern: &str, opts: &GlobOptions) -> std::io::Result<Vec<PathBuf>> {
    let regex = glob_to_regex(pattern);
    let mut walker = WalkDir::new(work_dir).follow_links(opts.follow_links);
    if let Some(max_depth) = opts.max_depth {
        walker = walker.max_depth(max_depth);
    }

    let mut matches = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        if entry.path() == work_dir {
            continue;
        }
        let relative = entry.path().strip_prefix(work_dir).unwrap_or(entry.path());
        let relative_str = relative.to_string_lossy();

        if !opts.hidden && is_hidden(relative) {
            continue;
        }
        match opts.entry_type {
            EntryType::File if !entry.file_type().is_file() => continue,
            EntryType::Dir if !entry.file_type().is_dir() => continue,
            _ => {}
        }
        if regex.is_match(&relative_str) {
            matches.push(relative.to_path_buf());
        }
    }
    matches.sort();
    Ok(matches)
}

fn is_hidden(relative: &Path) -> bool {
    relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}

/// Resolve a non-glob output pattern directly against the working
/// directory.
pub fn resolve_direct(work_dir: &Path, pattern: &str) -> PathBuf {
    work_dir.join(pattern)
}

/// Remove entries whose basename matches any staged input's basename —
/// used when an output declares `includeInputs = false`.
pub fn exclude_staged_inputs(outputs: Vec<PathBuf>, staged_input_names: &[String]) -> Vec<PathBuf> {
    outputs
        .into_iter()
        .filter(|p| {
            let basename = p.file_name().map(|n| n.to_string_lossy().into_owned());
            match basename {
                Some(name) => !staged_input_names.iter().any(|s| s == &name),
                None => true,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "glob_walk_tests.rs"]
mod tests;
