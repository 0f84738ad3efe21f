// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-addressed persistent cache: the `db` key-value store plus the
//! per-run index file that records binding order.

use crate::db::{CacheDb, CacheRecord};
use crate::error::DbError;
use crate::index_file::IndexFile;
use parking_lot::Mutex;
use rflow_core::{Fingerprint, TaskContext, TraceRecord};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

fn db_dir(cache_dir: &Path) -> PathBuf {
    cache_dir.join("db")
}

fn index_path(cache_dir: &Path, run_name: &str) -> PathBuf {
    cache_dir.join(format!("index.{run_name}"))
}

/// A session's `(db, index.<runName>)` pair.
pub struct Cache {
    db: CacheDb,
    index: Option<Mutex<IndexFile>>,
    cache_dir: PathBuf,
    run_name: String,
}

impl Cache {
    /// (Re)create `index.<runName>` and open `db` in read/write mode.
    pub async fn open(cache_dir: &Path, run_name: impl Into<String>) -> Result<Self, DbError> {
        let run_name = run_name.into();
        std::fs::create_dir_all(cache_dir)?;
        let db = CacheDb::open(&db_dir(cache_dir)).await?;
        let index = IndexFile::create(&index_path(cache_dir, &run_name))?;
        Ok(Self {
            db,
            index: Some(Mutex::new(index)),
            cache_dir: cache_dir.to_owned(),
            run_name,
        })
    }

    /// Require `index.<runName>` to already exist; open `db` read-only.
    pub fn open_for_read(cache_dir: &Path, run_name: impl Into<String>) -> Result<Self, DbError> {
        let run_name = run_name.into();
        let path = index_path(cache_dir, &run_name);
        let index = IndexFile::open_for_read(&path)?;
        let db = CacheDb::open_for_read(&db_dir(cache_dir))?;
        Ok(Self {
            db,
            index: Some(Mutex::new(index)),
            cache_dir: cache_dir.to_owned(),
            run_name,
        })
    }

    /// Open for `clean`: preserves the run's existing index (unlike
    /// `open`, which truncates it for a fresh run) but opens `db`
    /// read/write so `dec_entry` can retire records as their working
    /// directories are removed.
    pub fn open_for_clean(cache_dir: &Path, run_name: impl Into<String>) -> Result<Self, DbError> {
        let run_name = run_name.into();
        let path = index_path(cache_dir, &run_name);
        let index = IndexFile::open_for_read(&path)?;
        let db = CacheDb::open_sync(&db_dir(cache_dir))?;
        Ok(Self {
            db,
            index: Some(Mutex::new(index)),
            cache_dir: cache_dir.to_owned(),
            run_name,
        })
    }

    pub fn get_entry(&self, hash: &Fingerprint) -> Option<(TraceRecord, Option<TaskContext>)> {
        self.db.get(hash).map(|r| (r.trace, r.context))
    }

    pub async fn put_entry(
        &self,
        hash: Fingerprint,
        trace: TraceRecord,
        context: Option<TaskContext>,
    ) -> Result<(), DbError> {
        self.db.put(hash, trace, context).await
    }

    pub async fn inc_entry(&self, hash: Fingerprint) -> Result<(), DbError> {
        self.db.inc(hash).await
    }

    pub async fn dec_entry(&self, hash: Fingerprint) -> Result<(), DbError> {
        self.db.dec(hash).await
    }

    /// Append a `(hash, cached)` record to this run's index, in binding order.
    pub fn write_index(&self, hash: &Fingerprint, cached: bool) -> io::Result<()> {
        match &self.index {
            Some(index) => index.lock().append(hash, cached),
            None => Ok(()),
        }
    }

    /// Iterate the index in binding order, looking up each hash's db
    /// payload. Stale index entries (db payload missing) are skipped with
    /// a debug log rather than surfaced as an error.
    pub fn each_record(
        &self,
        mut f: impl FnMut(&Fingerprint, &CacheRecord),
    ) -> io::Result<()> {
        let records = match &self.index {
            Some(index) => index.lock().read_all()?,
            None => return Ok(()),
        };
        for (hash, _cached) in records {
            match self.db.get(&hash) {
                Some(record) => f(&hash, &record),
                None => debug!(hash = %hash, "stale cache index entry, db payload missing"),
            }
        }
        Ok(())
    }

    pub fn drop_index(&self) -> io::Result<()> {
        IndexFile::drop_file(&index_path(&self.cache_dir, &self.run_name))
    }

    /// Remove the entire per-session cache directory (`db` and all index files).
    pub fn drop_cache_dir(&self) -> io::Result<()> {
        match std::fs::remove_dir_all(&self.cache_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn checkpoint(&self) -> Result<(), DbError> {
        self.db.checkpoint().await
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
