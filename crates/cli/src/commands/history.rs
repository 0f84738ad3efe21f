// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `history`: print every run ever recorded, oldest first.

use crate::table::{Column, Table};
use anyhow::Result;
use rflow_core::RuntimeConfig;
use rflow_storage::HistoryFile;

pub fn run(config: &RuntimeConfig) -> Result<()> {
    let history = HistoryFile::new(config.history_file());
    render_table(&history)
}

/// Shared with `log`'s no-selection fallback.
pub fn render_table(history: &HistoryFile) -> Result<()> {
    let entries = history.all()?;
    let mut table = Table::new(vec![
        Column::muted("TIMESTAMP"),
        Column::left("RUN NAME"),
        Column::muted("SESSION ID"),
        Column::left("COMMAND"),
    ]);
    for entry in &entries {
        table.row(vec![
            entry.timestamp.map(|t| t.to_rfc3339()).unwrap_or_default(),
            entry.run_name.clone(),
            entry.session_id.clone(),
            entry.command_line.clone(),
        ]);
    }
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    table.render(&mut lock);
    Ok(())
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
