// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared table renderer for `history`'s default view and `log`'s
//! no-selection fallback.

use crate::color;

pub enum Align {
    Left,
    Right,
}

pub enum CellStyle {
    Plain,
    Muted,
    Status,
}

pub struct Column {
    pub name: &'static str,
    pub align: Align,
    pub style: CellStyle,
}

impl Column {
    pub fn left(name: &'static str) -> Self {
        Self { name, align: Align::Left, style: CellStyle::Plain }
    }

    pub fn muted(name: &'static str) -> Self {
        Self { name, align: Align::Left, style: CellStyle::Muted }
    }

    pub fn status(name: &'static str) -> Self {
        Self { name, align: Align::Left, style: CellStyle::Status }
    }
}

const SEP: &str = "  ";

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    colorize: bool,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, rows: Vec::new(), colorize: color::should_colorize() }
    }

    #[cfg(test)]
    pub fn plain(columns: Vec<Column>) -> Self {
        Self { columns, rows: Vec::new(), colorize: false }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Render the header and every row, widths auto-computed from data.
    /// Color is applied after padding so escape codes don't skew widths.
    pub fn render(&self, out: &mut impl std::io::Write) {
        if self.rows.is_empty() {
            return;
        }
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let data_max = self.rows.iter().map(|r| r.get(i).map_or(0, |s| s.len())).max().unwrap_or(0);
                col.name.len().max(data_max)
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let is_last = i == self.columns.len() - 1;
                let padded = if is_last { col.name.to_string() } else { pad(col.name, widths[i], &col.align) };
                if self.colorize { color::header(&padded) } else { padded }
            })
            .collect();
        let _ = writeln!(out, "{}", header.join(SEP));

        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let is_last = i == self.columns.len() - 1;
                    let raw = row.get(i).map(String::as_str).unwrap_or("");
                    let padded = if is_last { raw.to_string() } else { pad(raw, widths[i], &col.align) };
                    stylize(&padded, &col.style, self.colorize)
                })
                .collect();
            let _ = writeln!(out, "{}", cells.join(SEP));
        }
    }
}

fn pad(text: &str, width: usize, align: &Align) -> String {
    match align {
        Align::Left => format!("{text:<width$}"),
        Align::Right => format!("{text:>width$}"),
    }
}

fn stylize(text: &str, style: &CellStyle, colorize: bool) -> String {
    if !colorize {
        return text.to_string();
    }
    match style {
        CellStyle::Plain => text.to_string(),
        CellStyle::Muted => color::muted(text),
        CellStyle::Status => color::status(text),
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
