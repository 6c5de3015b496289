//! Import run records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::ImportLogId;

/// Which table an import or export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Members,
    Events,
    Trains,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Members => "members",
            DataKind::Events => "events",
            DataKind::Trains => "trains",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "members" => Ok(DataKind::Members),
            "events" => Ok(DataKind::Events),
            "trains" => Ok(DataKind::Trains),
            other => Err(format!("unknown data type: {other}")),
        }
    }
}

/// Interchange file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            FileFormat::Csv => "text/csv; charset=utf-8",
            FileFormat::Json => "application/json",
        }
    }

    /// Infers the format from a file name's extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        ext.parse().ok()
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "json" => Ok(FileFormat::Json),
            other => Err(format!("unknown file format: {other}")),
        }
    }
}

/// A rejected import row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    /// CSV: physical line the record starts on. JSON: 1-based array index.
    pub line: usize,
    pub error: String,
    /// The raw row as it was read.
    pub data: serde_json::Value,
}

/// Persisted outcome of one import run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportLog {
    pub id: ImportLogId,
    pub kind: DataKind,
    pub format: FileFormat,
    pub file_name: Option<String>,
    pub actor: String,
    pub at: DateTime<Utc>,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<RowError>,
}
