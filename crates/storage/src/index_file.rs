// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-run cache index: an append-only file of fixed-width records
//! `(16-byte fingerprint, 1-byte cached flag)`, written in the order a
//! processor binds its tasks.

use rflow_core::Fingerprint;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

pub const RECORD_LEN: usize = 17;

pub struct IndexFile {
    file: File,
    path: PathBuf,
}

impl IndexFile {
    /// Create (truncating any existing file) for a fresh or resumed run.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            file,
            path: path.to_owned(),
        })
    }

    /// Open an existing index for read-side operations (`log`, `clean`).
    pub fn open_for_read(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_owned(),
        })
    }

    pub fn append(&mut self, fingerprint: &Fingerprint, cached: bool) -> io::Result<()> {
        let mut buf = [0u8; RECORD_LEN];
        buf[..16].copy_from_slice(fingerprint.as_bytes());
        buf[16] = cached as u8;
        self.file.write_all(&buf)?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Read every record in binding order.
    pub fn read_all(&self) -> io::Result<Vec<(Fingerprint, bool)>> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        let mut out = Vec::new();
        let mut buf = [0u8; RECORD_LEN];
        loop {
            match reader.read_exact(&mut buf) {
                Ok(()) => {
                    let mut hash = [0u8; 16];
                    hash.copy_from_slice(&buf[..16]);
                    out.push((Fingerprint::from_bytes(hash), buf[16] != 0));
                }
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the index file.
    pub fn drop_file(path: &Path) -> io::Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "index_file_tests.rs"]
mod tests;
