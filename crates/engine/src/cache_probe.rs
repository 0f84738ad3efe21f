// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cache probe & submit loop: resolves a task's `workDir/<hash>`
//! folder, resolving hash collisions by rehashing, and decides whether the
//! binding can be resumed from a prior run's outputs.

use crate::output_collect::collect_outputs;
use parking_lot::Mutex;
use rflow_core::{Fingerprint, OutputDef, TaskContext};
use std::io;
use std::path::{Path, PathBuf};

/// Guards `workDir/<hash>` creation so two workers racing on the same
/// fingerprint observe a consistent existence check before either mkdirs.
#[derive(Default)]
pub struct WorkDirLock(Mutex<()>);

impl WorkDirLock {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn folder_for(work_dir: &Path, hash: &Fingerprint) -> PathBuf {
    work_dir.join(hash.dir_prefix()).join(hash.dir_rest())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Resumed { hash: Fingerprint, folder: PathBuf },
    Submitted { hash: Fingerprint, folder: PathBuf },
}

/// Resolve the folder for `hash`, rehashing on collision, and decide
/// whether the task can resume from a cached result.
///
/// `check_cached_output` is invoked only when the folder already existed
/// and `should_try_cache` is set; it should implement the same checks as
/// [`check_cached_output`].
pub fn probe_and_resolve_folder(
    lock: &WorkDirLock,
    work_dir: &Path,
    mut hash: Fingerprint,
    should_try_cache: bool,
    mut check_cached_output: impl FnMut(&Fingerprint, &Path) -> bool,
) -> io::Result<ProbeResult> {
    let mut tries: u32 = 0;
    loop {
        if tries > 0 {
            hash = crate::fingerprint::rehash(hash, tries);
        }
        let folder = folder_for(work_dir, &hash);

        let existed = {
            let _guard = lock.0.lock();
            let existed = folder.exists();
            if !existed {
                std::fs::create_dir_all(&folder)?;
            }
            existed
        };

        if should_try_cache && existed && check_cached_output(&hash, &folder) {
            return Ok(ProbeResult::Resumed { hash, folder });
        }
        if existed {
            tries += 1;
            continue;
        }
        return Ok(ProbeResult::Submitted { hash, folder });
    }
}

/// `checkCachedOutput`: succeeds iff the exit code file (for script tasks)
/// reports a configured success code and every declared output is
/// collectible from `folder`.
pub fn check_cached_output(
    folder: &Path,
    outputs: &[OutputDef],
    staged_input_names: &[String],
    is_script_task: bool,
    success_codes: &[i32],
    cached_context: Option<&TaskContext>,
) -> bool {
    if is_script_task {
        let exit_path = folder.join(".exitcode");
        let Ok(text) = std::fs::read_to_string(&exit_path) else {
            return false;
        };
        let Ok(code) = text.trim().parse::<i32>() else {
            return false;
        };
        if !success_codes.contains(&code) {
            return false;
        }
    }

    let stdout_path = folder.join(".command.out");
    let context = cached_context.cloned().unwrap_or_default();
    collect_outputs(folder, outputs, staged_input_names, &stdout_path, is_script_task, &context).is_ok()
}

#[cfg(test)]
#[path = "cache_probe_tests.rs"]
mod tests;
