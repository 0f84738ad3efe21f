// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use rflow_adapters::ExecutorError;
use rflow_storage::{DbError, HistoryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Cache(#[from] DbError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Executor(#[from] ExecutorError),
    #[error("declared output not collectible: {0}")]
    MissingOutput(String),
    #[error("value output references unknown name: {0}")]
    MissingValue(String),
    #[error("when guard evaluation failed: {0}")]
    GuardFailure(String),
    #[error("task is not recoverable: {0}")]
    NotRecoverable(String),
    #[error("aborting session: {0}")]
    Abort(String),
}
