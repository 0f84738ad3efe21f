// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent ordered key-value store backing the Cache: an in-memory
//! materialized map, durably logged and periodically checkpointed, with
//! all mutations serialized through a single background writer task.

use crate::error::DbError;
use parking_lot::RwLock;
use rflow_core::{Fingerprint, TaskContext, TraceRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Value stored at a fingerprint: the cached trace, the cached context (if
/// the process declared one), and the number of runs sharing this entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub trace: TraceRecord,
    pub context: Option<TaskContext>,
    pub ref_count: i32,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum LogOp {
    Put { hash: String, record: CacheRecord },
    Inc { hash: String },
    Dec { hash: String },
}

enum WriterMsg {
    Put(Fingerprint, CacheRecord, oneshot::Sender<Result<(), DbError>>),
    Inc(Fingerprint, oneshot::Sender<Result<(), DbError>>),
    Dec(Fingerprint, oneshot::Sender<Result<(), DbError>>),
    Checkpoint(oneshot::Sender<Result<(), DbError>>),
}

type MaterializedMap = HashMap<Fingerprint, CacheRecord>;

/// Handle to the single-writer agent serializing all db mutations.
///
/// Reads (`get`) bypass the channel and go straight to the shared
/// `RwLock`-protected map, since they never race with the writer's
/// read-modify-write sequencing requirement.
pub struct CacheDb {
    state: Arc<RwLock<MaterializedMap>>,
    tx: mpsc::Sender<WriterMsg>,
    db_dir: PathBuf,
}

const SNAPSHOT_NAME: &str = "snapshot.zst";
const LOG_NAME: &str = "log.jsonl";

impl CacheDb {
    /// Open (creating if absent) the db directory, replaying the snapshot
    /// and any log entries written after it.
    pub async fn open(db_dir: &Path) -> Result<Self, DbError> {
        Self::open_sync(db_dir)
    }

    /// Same as `open`, callable from non-async setup code (e.g. `clean`,
    /// which only needs `dec`/`get` and never awaits anything else first).
    pub fn open_sync(db_dir: &Path) -> Result<Self, DbError> {
        std::fs::create_dir_all(db_dir)?;
        let mut map = load_snapshot(&db_dir.join(SNAPSHOT_NAME))?;
        replay_log(&db_dir.join(LOG_NAME), &mut map)?;

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(db_dir.join(LOG_NAME))?;

        let state = Arc::new(RwLock::new(map));
        let (tx, rx) = mpsc::channel(256);
        spawn_writer(rx, state.clone(), log_file, db_dir.to_owned());

        Ok(Self {
            state,
            tx,
            db_dir: db_dir.to_owned(),
        })
    }

    /// Open read-only: loads the materialized state but starts no writer
    /// agent. Mutating calls on a read-only handle return `WriterGone`.
    pub fn open_for_read(db_dir: &Path) -> Result<Self, DbError> {
        let mut map = load_snapshot(&db_dir.join(SNAPSHOT_NAME))?;
        replay_log(&db_dir.join(LOG_NAME), &mut map)?;
        let (tx, _rx) = mpsc::channel(1);
        Ok(Self {
            state: Arc::new(RwLock::new(map)),
            tx,
            db_dir: db_dir.to_owned(),
        })
    }

    pub fn get(&self, hash: &Fingerprint) -> Option<CacheRecord> {
        self.state.read().get(hash).cloned()
    }

    pub async fn put(&self, hash: Fingerprint, trace: TraceRecord, context: Option<TaskContext>) -> Result<(), DbError> {
        let record = CacheRecord {
            trace,
            context,
            ref_count: 1,
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(WriterMsg::Put(hash, record, reply_tx))
            .await
            .map_err(|_| DbError::WriterGone)?;
        reply_rx.await.map_err(|_| DbError::WriterGone)?
    }

    pub async fn inc(&self, hash: Fingerprint) -> Result<(), DbError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(WriterMsg::Inc(hash, reply_tx))
            .await
            .map_err(|_| DbError::WriterGone)?;
        reply_rx.await.map_err(|_| DbError::WriterGone)?
    }

    pub async fn dec(&self, hash: Fingerprint) -> Result<(), DbError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(WriterMsg::Dec(hash, reply_tx))
            .await
            .map_err(|_| DbError::WriterGone)?;
        reply_rx.await.map_err(|_| DbError::WriterGone)?
    }

    /// Force a snapshot of the current materialized state and truncate the log.
    pub async fn checkpoint(&self) -> Result<(), DbError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(WriterMsg::Checkpoint(reply_tx))
            .await
            .map_err(|_| DbError::WriterGone)?;
        reply_rx.await.map_err(|_| DbError::WriterGone)?
    }

    pub fn entry_count(&self) -> usize {
        self.state.read().len()
    }

    /// Remove the entire db directory (used when dropping a session's cache).
    pub fn drop_dir(&self) -> io::Result<()> {
        match std::fs::remove_dir_all(&self.db_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn spawn_writer(
    mut rx: mpsc::Receiver<WriterMsg>,
    state: Arc<RwLock<MaterializedMap>>,
    mut log_file: File,
    db_dir: PathBuf,
) {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg {
                WriterMsg::Put(hash, record, reply) => {
                    let result = append_log(&mut log_file, &LogOp::Put {
                        hash: hash.to_hex(),
                        record: record.clone(),
                    });
                    if result.is_ok() {
                        state.write().insert(hash, record);
                    }
                    let _ = reply.send(result.map_err(DbError::from));
                }
                WriterMsg::Inc(hash, reply) => {
                    let result = (|| -> Result<(), DbError> {
                        append_log(&mut log_file, &LogOp::Inc { hash: hash.to_hex() })?;
                        if let Some(rec) = state.write().get_mut(&hash) {
                            rec.ref_count += 1;
                        }
                        Ok(())
                    })();
                    let _ = reply.send(result);
                }
                WriterMsg::Dec(hash, reply) => {
                    let result = (|| -> Result<(), DbError> {
                        append_log(&mut log_file, &LogOp::Dec { hash: hash.to_hex() })?;
                        let mut guard = state.write();
                        if let Some(rec) = guard.get_mut(&hash) {
                            rec.ref_count -= 1;
                            if rec.ref_count <= 0 {
                                guard.remove(&hash);
                            }
                        }
                        Ok(())
                    })();
                    let _ = reply.send(result);
                }
                WriterMsg::Checkpoint(reply) => {
                    let snapshot = state.read().clone();
                    let result: Result<(), DbError> = (|| {
                        write_snapshot(&db_dir.join(SNAPSHOT_NAME), &snapshot)?;
                        log_file = OpenOptions::new()
                            .create(true)
                            .write(true)
                            .truncate(true)
                            .open(db_dir.join(LOG_NAME))?;
                        Ok(())
                    })();
                    let _ = reply.send(result);
                }
            }
        }
    });
}

fn append_log(file: &mut File, op: &LogOp) -> Result<(), DbError> {
    let mut line = serde_json::to_vec(op)?;
    line.push(b'\n');
    file.write_all(&line)?;
    file.sync_data()?;
    Ok(())
}

fn load_snapshot(path: &Path) -> Result<MaterializedMap, DbError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let file = File::open(path)?;
    let decoder =
        zstd::stream::read::Decoder::new(file).map_err(|e| DbError::Compress(e.to_string()))?;
    let hex_map: HashMap<String, CacheRecord> = serde_json::from_reader(decoder)?;
    let mut map = HashMap::with_capacity(hex_map.len());
    for (hex, record) in hex_map {
        if let Ok(fp) = hex.parse::<Fingerprint>() {
            map.insert(fp, record);
        }
    }
    Ok(map)
}

fn write_snapshot(path: &Path, map: &MaterializedMap) -> io::Result<()> {
    let hex_map: HashMap<String, &CacheRecord> =
        map.iter().map(|(k, v)| (k.to_hex(), v)).collect();
    let json = serde_json::to_vec(&hex_map)?;
    let compressed =
        zstd::encode_all(json.as_slice(), 3).map_err(io::Error::other)?;

    let tmp_path = path.with_extension("tmp");
    {
        let mut f = File::create(&tmp_path)?;
        f.write_all(&compressed)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;
    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
    Ok(())
}

fn replay_log(path: &Path, map: &mut MaterializedMap) -> Result<(), DbError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    let reader = BufReader::new(file);
    for (offset, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let op: LogOp = match serde_json::from_str(&line) {
            Ok(op) => op,
            Err(e) => {
                debug!(offset, error = %e, "skipping corrupt cache log entry");
                continue;
            }
        };
        match op {
            LogOp::Put { hash, record } => {
                if let Ok(fp) = hash.parse::<Fingerprint>() {
                    map.insert(fp, record);
                }
            }
            LogOp::Inc { hash } => {
                if let Ok(fp) = hash.parse::<Fingerprint>() {
                    if let Some(rec) = map.get_mut(&fp) {
                        rec.ref_count += 1;
                    }
                }
            }
            LogOp::Dec { hash } => {
                if let Ok(fp) = hash.parse::<Fingerprint>() {
                    if let Some(rec) = map.get_mut(&fp) {
                        rec.ref_count -= 1;
                        if rec.ref_count <= 0 {
                            map.remove(&fp);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
