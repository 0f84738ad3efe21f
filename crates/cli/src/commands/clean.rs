// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clean`: remove cached work directories for selected runs, retiring
//! shared cache entries by reference count and dropping the per-session
//! cache directory once no history entry references it any more.

use crate::commands::log::resolve_selection_entries;
use anyhow::{bail, Result};
use clap::Args;
use rflow_core::RuntimeConfig;
use rflow_engine::folder_for;
use rflow_storage::{Cache, HistoryEntry, HistoryFile};

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Print what would be removed without touching anything.
    #[arg(short = 'n', long = "dry-run", conflicts_with = "force")]
    pub dry_run: bool,
    /// Actually remove work directories and cache entries.
    #[arg(short = 'f', long = "force")]
    pub force: bool,
    /// Suppress per-entry output.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
    #[arg(long = "before")]
    pub before: Option<String>,
    #[arg(long = "after")]
    pub after: Option<String>,
    #[arg(long = "but")]
    pub but: Option<String>,
    /// Run name, session id (prefix), or `last`.
    pub run: Option<String>,
}

pub async fn run(args: CleanArgs, config: &RuntimeConfig) -> Result<()> {
    if !args.dry_run && !args.force {
        bail!("refusing to clean without -n (dry run) or -f (force)");
    }

    let history = HistoryFile::new(config.history_file());
    let all_entries = history.all()?;
    let selected = resolve_selection_entries(&history, &args.before, &args.after, &args.but, &args.run)?
        .unwrap_or_else(|| all_entries.clone());

    for entry in &selected {
        clean_one(entry, &all_entries, config, args.dry_run, args.quiet).await?;
        if !args.dry_run {
            history.delete_entry(entry)?;
        }
    }
    Ok(())
}

async fn clean_one(
    entry: &HistoryEntry,
    all_entries: &[HistoryEntry],
    config: &RuntimeConfig,
    dry_run: bool,
    quiet: bool,
) -> Result<()> {
    let cache_dir = config.cache_dir(&entry.session_id);
    let cache = match Cache::open_for_clean(&cache_dir, entry.run_name.clone()) {
        Ok(c) => c,
        Err(e) => {
            if !quiet {
                eprintln!("skipping {}: {e}", entry.run_name);
            }
            return Ok(());
        }
    };

    let mut records = Vec::new();
    cache.each_record(|hash, record| records.push((*hash, record.ref_count)))?;

    for (hash, ref_count) in &records {
        let folder = folder_for(&config.work_dir, hash);
        if dry_run {
            if *ref_count <= 1 && !quiet {
                println!("would remove: {}", folder.display());
            }
            continue;
        }
        if folder.exists() {
            std::fs::remove_dir_all(&folder)?;
        }
        cache.dec_entry(*hash).await?;
        if !quiet {
            println!("removed: {}", folder.display());
        }
    }

    if dry_run {
        return Ok(());
    }

    cache.drop_index()?;
    let session_still_referenced = all_entries
        .iter()
        .any(|e| e.session_id == entry.session_id && e != entry);
    if !session_still_referenced {
        cache.drop_cache_dir()?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "clean_tests.rs"]
mod tests;
