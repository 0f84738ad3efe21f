// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output collection: resolves a process's declared outputs against a
//! completed task's working directory and context, and applies the
//! declared binding mode.

use crate::error::EngineError;
use crate::glob_walk::{collect_glob, exclude_staged_inputs, is_glob_pattern, resolve_direct};
use rflow_core::{BindMode, ContextValue, OutputDef, OutputSource, TaskContext};
use std::path::Path;

/// One output channel's collected, mode-applied bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedOutput {
    pub name: String,
    pub bindings: Vec<ContextValue>,
}

/// Resolve every declared output of a completed task.
///
/// `stdout_path` is the captured stdout file; `is_script_task` controls
/// whether a missing stdout file is an error (script tasks) or simply
/// absent (synthetic/native tasks have no stdout file to read).
pub fn collect_outputs(
    work_dir: &Path,
    outputs: &[OutputDef],
    staged_input_names: &[String],
    stdout_path: &Path,
    is_script_task: bool,
    context: &TaskContext,
) -> Result<Vec<CollectedOutput>, EngineError> {
    outputs
        .iter()
        .map(|def| {
            let value = collect_one(work_dir, def, staged_input_names, stdout_path, is_script_task, context)?;
            Ok(CollectedOutput {
                name: def.name.clone(),
                bindings: apply_mode(def.mode, value),
            })
        })
        .collect()
}

fn collect_one(
    work_dir: &Path,
    def: &OutputDef,
    staged_input_names: &[String],
    stdout_path: &Path,
    is_script_task: bool,
    context: &TaskContext,
) -> Result<ContextValue, EngineError> {
    match &def.source {
        OutputSource::Stdout => {
            if !stdout_path.exists() {
                if is_script_task {
                    return Err(EngineError::MissingOutput(def.name.clone()));
                }
                return Ok(ContextValue::Text(String::new()));
            }
            let text = std::fs::read_to_string(stdout_path)?;
            Ok(ContextValue::Text(text))
        }
        OutputSource::File {
            pattern,
            include_inputs,
            glob_opts,
        } => {
            let mut matches = if is_glob_pattern(pattern) {
                collect_glob(work_dir, pattern, glob_opts)?
            } else {
                let direct = resolve_direct(work_dir, pattern);
                if direct.exists() {
                    vec![direct.strip_prefix(work_dir).unwrap_or(&direct).to_path_buf()]
                } else {
                    Vec::new()
                }
            };
            if !include_inputs {
                matches = exclude_staged_inputs(matches, staged_input_names);
            }
            if matches.is_empty() {
                return Err(EngineError::MissingOutput(def.name.clone()));
            }
            let paths: Vec<_> = matches.into_iter().map(|rel| work_dir.join(rel)).collect();
            Ok(if paths.len() == 1 {
                #[allow(clippy::expect_used)]
                let single = paths.into_iter().next().expect("checked len == 1");
                ContextValue::Path(single)
            } else {
                ContextValue::Paths(paths)
            })
        }
        OutputSource::Value { expr } => context
            .get(expr)
            .cloned()
            .ok_or_else(|| EngineError::MissingValue(expr.clone())),
    }
}

fn apply_mode(mode: BindMode, value: ContextValue) -> Vec<ContextValue> {
    match mode {
        BindMode::Standard => vec![value],
        BindMode::Flatten => value.flatten_leaves(),
        BindMode::Combine => combine(value),
    }
}

/// `combine`: when the collected value is a list of lists (one list per
/// declared tuple slot), emit the Cartesian product across the slots; any
/// other shape behaves like `standard`.
fn combine(value: ContextValue) -> Vec<ContextValue> {
    let ContextValue::List(slots) = &value else {
        return vec![value];
    };
    let slot_lists: Option<Vec<&Vec<ContextValue>>> = slots
        .iter()
        .map(|v| match v {
            ContextValue::List(inner) => Some(inner),
            _ => None,
        })
        .collect();
    let Some(slot_lists) = slot_lists else {
        return vec![value];
    };

    let mut combinations: Vec<Vec<ContextValue>> = vec![Vec::new()];
    for slot in slot_lists {
        let mut next = Vec::with_capacity(combinations.len() * slot.len());
        for combo in &combinations {
            for item in slot {
                let mut extended = combo.clone();
                extended.push(item.clone());
                next.push(extended);
            }
        }
        combinations = next;
    }
    combinations.into_iter().map(ContextValue::List).collect()
}

#[cfg(test)]
#[path = "output_collect_tests.rs"]
mod tests;
