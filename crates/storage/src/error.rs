// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("compression error: {0}")]
    Compress(String),
    #[error("corrupt log entry at offset {offset}: {message}")]
    Corrupt { offset: u64, message: String },
    #[error("writer agent is no longer running")]
    WriterGone,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("no history entries found")]
    Empty,
    #[error("unknown run or session id: {0}")]
    NotFound(String),
    #[error("ambiguous session id prefix {prefix:?} matches {joined}", joined = ids.join(", "))]
    Ambiguous { prefix: String, ids: Vec<String> },
}
