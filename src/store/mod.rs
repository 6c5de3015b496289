//! Persistent store for every alliance table.
//!
//! # Layout
//!
//! ```text
//! <data_dir>/
//!   snapshot.json   # every table, rewritten atomically on each commit
//!   audit.log       # append-only JSON Lines: train history, imports, exports
//! ```
//!
//! # Transactions
//!
//! All writes go through [`Store::apply`]: the closure mutates a copy of the
//! tables; only when it succeeds and the new snapshot is durable does the
//! copy replace the live tables. A failing closure or a failed write leaves
//! both memory and disk untouched, so multi-row changes are all-or-nothing.
//!
//! Audit records queued during the transaction are appended after the
//! snapshot is written. A failed audit append is logged, not propagated:
//! the data change has already been committed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info};

pub mod audit;
pub mod durable;
pub mod snapshot;
pub mod table;
pub mod tables;

pub use audit::{AuditLog, AuditLogError, AuditPayload, AuditRecord};
pub use snapshot::{SCHEMA_VERSION, Snapshot, SnapshotError};
pub use table::{Row, Table};
pub use tables::Tables;

const SNAPSHOT_FILE: &str = "snapshot.json";
const AUDIT_FILE: &str = "audit.log";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("audit log error: {0}")]
    Audit(#[from] AuditLogError),
}

/// The store as shared between HTTP handlers and the scheduler.
pub type SharedStore = Arc<RwLock<Store>>;

pub struct Store {
    dir: PathBuf,
    tables: Tables,
    audit: AuditLog,
}

impl Store {
    /// Opens the store in `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::DataDir {
            path: dir.clone(),
            source,
        })?;

        let tables = match snapshot::try_load_snapshot(&dir.join(SNAPSHOT_FILE))? {
            Some(snapshot) => {
                info!(
                    saved_at = %snapshot.saved_at,
                    members = snapshot.tables.members.len(),
                    trains = snapshot.tables.trains.len(),
                    "Loaded snapshot"
                );
                snapshot.tables
            }
            None => {
                info!(dir = %dir.display(), "No snapshot found, starting empty");
                Tables::default()
            }
        };

        let audit = AuditLog::open(dir.join(AUDIT_FILE))?;

        Ok(Store { dir, tables, audit })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Runs `f` as a transaction over the tables.
    pub fn apply<T, E>(&mut self, f: impl FnOnce(&mut Tables) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut draft = self.tables.clone();
        let value = f(&mut draft)?;
        let pending = draft.take_pending_audit();

        snapshot::save_snapshot(&self.dir.join(SNAPSHOT_FILE), &draft)
            .map_err(StoreError::from)?;
        self.tables = draft;

        for payload in pending {
            if let Err(e) = self.audit.append(payload) {
                error!(error = %e, "Failed to append audit record");
            }
        }
        Ok(value)
    }

    /// Like [`Store::apply`] for changes that cannot fail on their own.
    pub fn mutate<T>(&mut self, f: impl FnOnce(&mut Tables) -> T) -> Result<T, StoreError> {
        self.apply(|tables| Ok(f(tables)))
    }

    /// Appends an audit record that has no accompanying table change.
    pub fn record(&mut self, payload: AuditPayload) -> Result<AuditRecord, StoreError> {
        Ok(self.audit.append(payload)?)
    }

    /// Reads back the audit log.
    pub fn audit_records(&self) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self.audit.records()?)
    }
}
