// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("submit command failed: {0}")]
    SubmitFailed(String),
    #[error("could not parse job id from submit output: {0:?}")]
    UnparseableJobId(String),
    #[error("unknown job handle: {0}")]
    UnknownHandle(String),
    #[error("kill command failed: {0}")]
    KillFailed(String),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_yaml::Error),
}
