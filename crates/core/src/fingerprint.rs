// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! 128-bit task content fingerprint: the Cache's key type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw 128-bit digest identifying a task's reproducible content: its
/// processor, resolved context, and (for file inputs) content or metadata
/// depending on the configured hash mode.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Fingerprint(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(32);
        for b in self.0 {
            s.push_str(&format!("{b:02x}"));
        }
        s
    }

    /// The two-character directory prefix used to shard `workDir/<hash>`.
    pub fn dir_prefix(&self) -> String {
        self.to_hex()[..2].to_string()
    }

    /// The remainder of the hash after the directory prefix.
    pub fn dir_rest(&self) -> String {
        self.to_hex()[2..].to_string()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FingerprintParseError {
    #[error("fingerprint must be 32 hex characters, got {0}")]
    WrongLength(usize),
    #[error("invalid hex in fingerprint: {0}")]
    InvalidHex(#[from] std::num::ParseIntError),
}

impl FromStr for Fingerprint {
    type Err = FingerprintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(FingerprintParseError::WrongLength(s.len()));
        }
        let mut bytes = [0u8; 16];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)?;
        }
        Ok(Fingerprint(bytes))
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = FingerprintParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(f: Fingerprint) -> String {
        f.to_hex()
    }
}

#[cfg(test)]
#[path = "fingerprint_tests.rs"]
mod tests;
