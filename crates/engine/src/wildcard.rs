// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File input name expansion: turns a formal file-input name (possibly
//! containing `*`/`?` wildcards) plus N concrete staged values into the N
//! concrete staged file names actually linked into the working directory.

use std::path::{Path, PathBuf};

/// Expand a declared file-input name against the number of bound values.
///
/// `name` is the formal parameter's declared file name (e.g. `"reads.fq"`,
/// `"*.bam"`, `"chunk_???.txt"`, or empty/`"*"`). Returns one concrete name
/// per value, in the same order as `values`.
pub fn expand_names(name: &str, values: &[PathBuf]) -> Result<Vec<String>, String> {
    if values.is_empty() {
        return Ok(Vec::new());
    }

    if name.is_empty() || name == "*" {
        return Ok(values
            .iter()
            .map(|v| original_basename(v))
            .collect());
    }

    if let Some(dir) = name.strip_suffix("/*") {
        return Ok(values
            .iter()
            .map(|v| format!("{dir}/{}", original_basename(v)))
            .collect());
    }

    if name.contains("???") || contains_question_run(name) {
        return expand_question_marks(name, values);
    }

    if let Some(star_pos) = name.find('*') {
        return Ok(expand_star(name, star_pos, values));
    }

    // No wildcard: single value uses the name verbatim; multiple values
    // are treated as `name + "*"`.
    if values.len() == 1 {
        Ok(vec![name.to_string()])
    } else {
        let synthesized = format!("{name}*");
        #[allow(clippy::expect_used)]
        let star_pos = synthesized.find('*').expect("synthesized name always has '*'");
        Ok(expand_star(&synthesized, star_pos, values))
    }
}

fn original_basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn contains_question_run(name: &str) -> bool {
    name.contains('?')
}

fn expand_star(name: &str, star_pos: usize, values: &[PathBuf]) -> Vec<String> {
    let (prefix, rest) = name.split_at(star_pos);
    let suffix = &rest[1..];
    if values.len() == 1 {
        return vec![format!("{prefix}{suffix}")];
    }
    values
        .iter()
        .enumerate()
        .map(|(i, _)| format!("{prefix}{}{suffix}", i + 1))
        .collect()
}

fn expand_question_marks(name: &str, values: &[PathBuf]) -> Result<Vec<String>, String> {
    let run_start = name.find('?').ok_or_else(|| "no '?' run found".to_string())?;
    let run_len = name[run_start..].chars().take_while(|c| *c == '?').count();
    if values.len() == 1 {
        return Err(format!(
            "file name pattern '{name}' requires multiple values to expand its '?' run"
        ));
    }
    let prefix = &name[..run_start];
    let suffix = &name[run_start + run_len..];
    Ok(values
        .iter()
        .enumerate()
        .map(|(i, _)| format!("{prefix}{:0width$}{suffix}", i + 1, width = run_len))
        .collect())
}

#[cfg(test)]
#[path = "wildcard_tests.rs"]
mod tests;
