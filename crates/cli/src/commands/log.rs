// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `log`: print one line per cached task, selected by run/session, filtered
//! by `-F`, and rendered either as a field list, a template, or (with no
//! selection at all) the plain history table.

use crate::filter::{self, FieldValue, FilterContext};
use crate::render;
use crate::{color, commands::history};
use anyhow::Result;
use clap::Args;
use rflow_adapters::TaskPaths;
use rflow_core::{trace_fields, RuntimeConfig, TraceRecord, TraceValue};
use rflow_storage::{Cache, HistoryEntry, HistoryFile};
use std::fs;
use std::path::Path;

const AVAILABLE_FIELDS: &[&str] = &[
    trace_fields::TASK_ID,
    trace_fields::PROCESS,
    trace_fields::EXIT,
    trace_fields::SUBMIT,
    trace_fields::START,
    trace_fields::COMPLETE,
    trace_fields::REALTIME,
    trace_fields::CPU_PERCENT,
    trace_fields::VMEM,
    trace_fields::RSS,
    trace_fields::FOLDER,
];

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Separator between fields when `-f` is used.
    #[arg(short = 's', long, default_value = "\t")]
    pub separator: String,
    /// Comma-separated list of fields to print.
    #[arg(short = 'f', long = "fields")]
    pub fields: Option<String>,
    /// Template string with `$field`/`${field}` placeholders.
    #[arg(short = 't', long = "template")]
    pub template: Option<String>,
    /// List the available field names and exit.
    #[arg(short = 'l', long = "list-fields")]
    pub list_fields: bool,
    /// Boolean expression over trace fields and `stdout`/`stderr`/`log`/`env`.
    #[arg(short = 'F', long = "filter")]
    pub filter: Option<String>,
    #[arg(long = "before")]
    pub before: Option<String>,
    #[arg(long = "after")]
    pub after: Option<String>,
    #[arg(long = "but")]
    pub but: Option<String>,
    /// Run name, session id (prefix), or `last`.
    pub run: Option<String>,
}

pub fn run(args: LogArgs, config: &RuntimeConfig) -> Result<()> {
    if args.list_fields {
        for name in AVAILABLE_FIELDS {
            println!("{name}");
        }
        return Ok(());
    }

    let history = HistoryFile::new(config.history_file());
    let selection = resolve_selection(&history, &args)?;
    let Some(entries) = selection else {
        return history::render_table(&history);
    };

    let filter_expr = args.filter.as_deref().map(filter::compile).transpose()?;
    let fields: Option<Vec<&str>> = args.fields.as_deref().map(|s| s.split(',').map(str::trim).collect());

    for entry in &entries {
        let cache_dir = config.cache_dir(&entry.session_id);
        let cache = match Cache::open_for_read(&cache_dir, entry.run_name.clone()) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{}", color::muted(&format!("skipping {}: {e}", entry.run_name)));
                continue;
            }
        };
        cache.each_record(|_hash, record| {
            let folder = record.trace.folder().map(Path::new);
            let ctx = RecordContext { trace: &record.trace, work_dir: folder, tail_lines: config.log_filter_tail_lines };
            if let Some(expr) = &filter_expr {
                if !filter::eval(expr, &ctx) {
                    return;
                }
            }
            let line = if let Some(template) = &args.template {
                render::render_template(&record.trace, template)
            } else if let Some(fields) = &fields {
                render::render_fields(&record.trace, fields, &args.separator)
            } else {
                render::render_fields(&record.trace, &[render::DEFAULT_FIELD], &args.separator)
            };
            println!("{line}");
        })?;
    }
    Ok(())
}

/// `None` means no selector was given at all: fall back to the plain
/// history table rather than every cached record of every run.
fn resolve_selection(history: &HistoryFile, args: &LogArgs) -> Result<Option<Vec<HistoryEntry>>> {
    resolve_selection_entries(history, &args.before, &args.after, &args.but, &args.run)
}

/// Shared by `log` (no selector falls back to the history table) and
/// `clean` (no selector defaults to every entry).
pub(crate) fn resolve_selection_entries(
    history: &HistoryFile,
    before: &Option<String>,
    after: &Option<String>,
    but: &Option<String>,
    run: &Option<String>,
) -> Result<Option<Vec<HistoryEntry>>> {
    if let Some(token) = before {
        return Ok(Some(history.find_before(token)?));
    }
    if let Some(token) = after {
        return Ok(Some(history.find_after(token)?));
    }
    if let Some(token) = but {
        return Ok(Some(history.find_but(token)?));
    }
    if let Some(token) = run {
        return Ok(Some(vec![history.find_by(token)?]));
    }
    Ok(None)
}

/// A cache record plus its task's work directory, exposed as a
/// [`FilterContext`]. `stdout`/`stderr`/`log`/`env` are only read from disk
/// when a compiled filter actually references them.
struct RecordContext<'a> {
    trace: &'a TraceRecord,
    work_dir: Option<&'a Path>,
    tail_lines: usize,
}

impl FilterContext for RecordContext<'_> {
    fn field(&self, name: &str) -> FieldValue {
        match name {
            "stdout" => self.tail_of(|p| &p.stdout),
            "stderr" => self.tail_of(|p| &p.stderr),
            "log" => self.tail_of(|p| &p.merged_log),
            "env" => self.tail_of(|p| &p.env_dump),
            _ => match self.trace.get(name) {
                None => FieldValue::Missing,
                Some(TraceValue::Text(s)) => FieldValue::Text(s.clone()),
                Some(TraceValue::Integer(n)) => FieldValue::Number(*n as f64),
                Some(TraceValue::Float(f)) => FieldValue::Number(*f),
                Some(TraceValue::Path(p)) => FieldValue::Text(p.display().to_string()),
            },
        }
    }
}

impl RecordContext<'_> {
    fn tail_of(&self, pick: impl Fn(&TaskPaths) -> &std::path::PathBuf) -> FieldValue {
        let Some(work_dir) = self.work_dir else {
            return FieldValue::Missing;
        };
        let paths = TaskPaths::for_work_dir(work_dir);
        match fs::read_to_string(pick(&paths)) {
            Ok(contents) => {
                let text: String = contents.lines().take(self.tail_lines).collect::<Vec<_>>().join("\n");
                FieldValue::Text(text)
            }
            Err(_) => FieldValue::Missing,
        }
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
