// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::IsTerminal;

const RESET: &str = "\x1b[0m";

/// Priority: `NO_COLOR=1` disables, `COLOR=1` forces, else a TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Header color (steel blue), used for table column headers.
pub fn header(text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;74m{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Muted color (dark grey), used for secondary columns.
pub fn muted(text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;240m{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Colorize a task status: green for succeeded/cached/submitted, red for
/// failed/skipped, default for anything else.
pub fn status(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }
    let lower = text.to_lowercase();
    let code = match lower.as_str() {
        "succeeded" | "cached" | "submitted" => "\x1b[32m",
        "failed" => "\x1b[31m",
        "skipped" => "\x1b[33m",
        _ => return text.to_string(),
    };
    format!("{code}{text}{RESET}")
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
