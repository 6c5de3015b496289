//! Append-only audit log.
//!
//! Every train mutation, import, export and permission change is appended
//! here as one JSON object per line. Complete lines are always valid JSON,
//! so a crash mid-write leaves at most one partial trailing line, which
//! [`AuditLog::open`] truncates before appending again. Any other bad line
//! is corruption and fails the open without touching the file.
//!
//! ```json
//! {"seq":4,"ts":"2026-03-09T20:00:00Z","type":"train","action":"status_changed","actor":"system","target":12,"details":"SCHEDULED -> BOARDING"}
//! ```

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::durable::fsync_file;
use crate::types::{DataKind, FileFormat, ImportLogId, TrainHistoryEntry};

#[derive(Debug, Error)]
pub enum AuditLogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt audit record on line {line}")]
    Corrupt { line: usize },
}

pub type Result<T> = std::result::Result<T, AuditLogError>;

/// One line of the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Monotonic sequence number.
    pub seq: u64,

    pub ts: DateTime<Utc>,

    #[serde(flatten)]
    pub payload: AuditPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditPayload {
    /// A train history row.
    Train(TrainHistoryEntry),

    /// An import run finished.
    #[serde(rename_all = "camelCase")]
    Import {
        import_id: ImportLogId,
        kind: DataKind,
        actor: String,
        success_count: usize,
        error_count: usize,
    },

    /// Data was exported.
    #[serde(rename_all = "camelCase")]
    Export {
        kind: DataKind,
        format: FileFormat,
        actor: String,
        rows: usize,
    },

    /// The permission table was edited.
    PermissionsUpdated { actor: String },
}

impl AuditPayload {
    pub fn train_history(&self) -> Option<&TrainHistoryEntry> {
        match self {
            AuditPayload::Train(entry) => Some(entry),
            _ => None,
        }
    }
}

/// Handle for appending to the audit log.
pub struct AuditLog {
    file: File,
    path: PathBuf,
    next_seq: u64,
}

impl AuditLog {
    /// Opens (or creates) the log, truncating a partial trailing line left
    /// by a crash and resuming the sequence after the last complete record.
    ///
    /// Fails with [`AuditLogError::Corrupt`] if a newline-terminated line
    /// does not parse or breaks the sequence order.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (records, valid_len) = scan(&path)?;

        if path.exists() && valid_len < std::fs::metadata(&path)?.len() {
            let file = OpenOptions::new().write(true).open(&path)?;
            file.set_len(valid_len)?;
            fsync_file(&file)?;
        }

        let next_seq = records.last().map(|r| r.seq + 1).unwrap_or(0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(AuditLog {
            file,
            path,
            next_seq,
        })
    }

    /// Appends a record and syncs it to disk.
    pub fn append(&mut self, payload: AuditPayload) -> Result<AuditRecord> {
        let record = AuditRecord {
            seq: self.next_seq,
            ts: Utc::now(),
            payload,
        };

        let json = serde_json::to_string(&record)?;
        writeln!(self.file, "{}", json)?;
        fsync_file(&self.file)?;

        self.next_seq += 1;
        Ok(record)
    }

    /// Reads every complete record currently in the log.
    pub fn records(&self) -> Result<Vec<AuditRecord>> {
        Ok(scan(&self.path)?.0)
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads a log file.
///
/// Returns the records and the byte length of the complete lines. A final
/// line without its newline is left out of both; any complete line that
/// does not parse or whose sequence number does not increase is an error.
fn scan(path: &Path) -> Result<(Vec<AuditRecord>, u64)> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok((vec![], 0)),
        Err(e) => return Err(e.into()),
    };

    let mut reader = BufReader::new(file);
    let mut records: Vec<AuditRecord> = Vec::new();
    let mut valid_len = 0u64;
    let mut line_no = 0usize;

    loop {
        let mut line = String::new();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            break;
        }
        line_no += 1;

        // A line without its newline was cut off mid-write.
        if !line.ends_with('\n') {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            valid_len += bytes_read as u64;
            continue;
        }

        match serde_json::from_str::<AuditRecord>(trimmed) {
            Ok(record) if records.last().is_none_or(|prev| record.seq > prev.seq) => {
                records.push(record);
                valid_len += bytes_read as u64;
            }
            _ => return Err(AuditLogError::Corrupt { line: line_no }),
        }
    }

    Ok((records, valid_len))
}
