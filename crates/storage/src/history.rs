// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `.nextflow.history`-style run ledger: one line per session, resolved by
//! id prefix, run name, or the `last` token.

use crate::error::HistoryError;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: Option<DateTime<Utc>>,
    pub run_name: String,
    pub session_id: String,
    pub command_line: String,
}

impl HistoryEntry {
    fn to_line(&self) -> String {
        match self.timestamp {
            Some(ts) => format!(
                "{}\t{}\t{}\t{}",
                ts.to_rfc3339(),
                self.run_name,
                self.session_id,
                self.command_line
            ),
            None => format!("{}\t{}", self.session_id, self.command_line),
        }
    }

    fn parse_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        match fields.as_slice() {
            [session_id, command_line] => Some(Self {
                timestamp: None,
                run_name: String::new(),
                session_id: session_id.to_string(),
                command_line: command_line.to_string(),
            }),
            [ts, run_name, session_id, command_line] => Some(Self {
                timestamp: DateTime::parse_from_rfc3339(ts)
                    .ok()
                    .map(|d| d.with_timezone(&Utc)),
                run_name: run_name.to_string(),
                session_id: session_id.to_string(),
                command_line: command_line.to_string(),
            }),
            _ => None,
        }
    }
}

/// A character is "uuid-shaped" iff every character is a hex digit or `-`.
pub fn is_uuid_shaped(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c == '-' || c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open_locked(&self, write: bool) -> Result<File, HistoryError> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(write)
            .open(&self.path)?;
        if write {
            file.lock_exclusive()?;
        } else {
            file.lock_shared()?;
        }
        Ok(file)
    }

    pub fn append(
        &self,
        session_id: impl Into<String>,
        run_name: impl Into<String>,
        command_line: impl Into<String>,
    ) -> Result<(), HistoryError> {
        let entry = HistoryEntry {
            timestamp: Some(Utc::now()),
            run_name: run_name.into(),
            session_id: session_id.into(),
            command_line: command_line.into(),
        };
        let mut file = self.open_locked(true)?;
        writeln!(file, "{}", entry.to_line())?;
        FileExt::unlock(&file)?;
        Ok(())
    }

    pub fn all(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = self.open_locked(false)?;
        let reader = BufReader::new(&file);
        let entries = reader
            .lines()
            .map_while(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| HistoryEntry::parse_line(&l))
            .collect();
        FileExt::unlock(&file)?;
        Ok(entries)
    }

    pub fn find_by_id(&self, prefix: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|e| e.session_id.starts_with(prefix))
            .collect())
    }

    /// Resolve a prefix to exactly one entry, erroring on ambiguity.
    pub fn find_by_id_unique(&self, prefix: &str) -> Result<HistoryEntry, HistoryError> {
        let mut matches = self.find_by_id(prefix)?;
        match matches.len() {
            0 => Err(HistoryError::NotFound(prefix.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(HistoryError::Ambiguous {
                prefix: prefix.to_string(),
                ids: matches.iter().map(|e| e.session_id.clone()).collect(),
            }),
        }
    }

    pub fn find_by_name(&self, run_name: &str) -> Result<HistoryEntry, HistoryError> {
        self.all()?
            .into_iter()
            .rev()
            .find(|e| e.run_name == run_name)
            .ok_or_else(|| HistoryError::NotFound(run_name.to_string()))
    }

    /// `"last"` resolves to the most recent entry; a uuid-shaped token
    /// resolves by session id prefix; anything else resolves by run name.
    pub fn find_by(&self, token: &str) -> Result<HistoryEntry, HistoryError> {
        if token == "last" {
            self.all()?.into_iter().last().ok_or(HistoryError::Empty)
        } else if is_uuid_shaped(token) {
            self.find_by_id_unique(token)
        } else {
            self.find_by_name(token)
        }
    }

    fn position_of(&self, entries: &[HistoryEntry], target: &HistoryEntry) -> Option<usize> {
        entries.iter().position(|e| e == target)
    }

    pub fn find_before(&self, token: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let target = self.find_by(token)?;
        let entries = self.all()?;
        let idx = self.position_of(&entries, &target).unwrap_or(0);
        Ok(entries.into_iter().take(idx).collect())
    }

    pub fn find_after(&self, token: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let target = self.find_by(token)?;
        let entries = self.all()?;
        let idx = self.position_of(&entries, &target).unwrap_or(entries.len());
        Ok(entries.into_iter().skip(idx + 1).collect())
    }

    pub fn find_but(&self, token: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let target = self.find_by(token)?;
        Ok(self
            .all()?
            .into_iter()
            .filter(|e| *e != target)
            .collect())
    }

    /// Rewrite the file without `entry`, under an exclusive advisory lock.
    pub fn delete_entry(&self, entry: &HistoryEntry) -> Result<(), HistoryError> {
        let remaining: Vec<HistoryEntry> = self
            .all()?
            .into_iter()
            .filter(|e| e != entry)
            .collect();
        let mut file = self.open_locked(true)?;
        file.set_len(0)?;
        use std::io::Seek;
        file.seek(std::io::SeekFrom::Start(0))?;
        for e in &remaining {
            writeln!(file, "{}", e.to_line())?;
        }
        FileExt::unlock(&file)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
