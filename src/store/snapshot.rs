//! Snapshot persistence.
//!
//! The whole store is written to `snapshot.json` after every committed
//! transaction, atomically via [`write_atomic`].

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::durable::write_atomic;
use super::tables::Tables;

/// Current schema version. Increment when making breaking changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema version mismatch: expected {expected}, got {got}")]
    SchemaMismatch { expected: u32, got: u32 },
}

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    pub tables: Tables,
}

impl Snapshot {
    pub fn new(tables: Tables) -> Self {
        Snapshot {
            schema_version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            tables,
        }
    }
}

/// Serializes `tables` into a fresh snapshot at `path`.
pub fn save_snapshot(path: &Path, tables: &Tables) -> Result<()> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct SnapshotRef<'a> {
        schema_version: u32,
        saved_at: DateTime<Utc>,
        tables: &'a Tables,
    }

    let bytes = serde_json::to_vec_pretty(&SnapshotRef {
        schema_version: SCHEMA_VERSION,
        saved_at: Utc::now(),
        tables,
    })?;
    write_atomic(path, &bytes)?;
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let bytes = std::fs::read(path)?;
    let snapshot: Snapshot = serde_json::from_slice(&bytes)?;

    if snapshot.schema_version != SCHEMA_VERSION {
        return Err(SnapshotError::SchemaMismatch {
            expected: SCHEMA_VERSION,
            got: snapshot.schema_version,
        });
    }
    Ok(snapshot)
}

/// Loads a snapshot, returning `None` if the file doesn't exist.
pub fn try_load_snapshot(path: &Path) -> Result<Option<Snapshot>> {
    match load_snapshot(path) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(SnapshotError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
