//! Bulk import and export of members, events and trains.
//!
//! An import runs in two phases. [`parse_rows`] turns the uploaded bytes
//! into numbered rows and fails only when the file as a whole is unreadable.
//! [`apply_rows`] then applies every row inside one store transaction,
//! collecting a `{line, error, data}` entry for each row that is rejected
//! while the valid ones still go through. The full error list is kept in
//! the import log; the response only carries the first few.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

pub mod csv;
pub mod export;
pub mod json;
pub mod rows;

pub use csv::CsvError;
pub use export::{ExportFile, export};

use crate::store::{AuditPayload, Tables};
use crate::types::{DataKind, FileFormat, ImportLog, ImportLogId, RowError};
use rows::{Applied, Row};

/// Row errors included in an import response.
pub const MAX_REPORTED_ERRORS: usize = 10;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file is not valid UTF-8")]
    Encoding,

    #[error("JSON import must be an object or an array of objects")]
    JsonShape,
}

/// Who is importing what.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub kind: DataKind,
    pub format: FileFormat,
    pub file_name: Option<String>,
    pub actor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub import_id: ImportLogId,
    pub kind: DataKind,
    pub format: FileFormat,
    pub success_count: usize,
    pub error_count: usize,
    pub created: usize,
    pub updated: usize,
    /// The first [`MAX_REPORTED_ERRORS`] row errors.
    pub errors: Vec<RowError>,
}

/// Decodes an uploaded file into `(line, row)` pairs.
pub fn parse_rows(format: FileFormat, bytes: &[u8]) -> Result<Vec<(usize, Value)>, ImportError> {
    let text = std::str::from_utf8(bytes).map_err(|_| ImportError::Encoding)?;
    match format {
        FileFormat::Csv => Ok(csv::parse_with_header(text)?),
        FileFormat::Json => json::parse_rows(text),
    }
}

/// Applies parsed rows and records the run in the import log.
pub fn apply_rows(
    tables: &mut Tables,
    request: &ImportRequest,
    rows: Vec<(usize, Value)>,
    now: DateTime<Utc>,
) -> ImportReport {
    let mut errors = Vec::new();
    let mut created = 0;
    let mut updated = 0;

    for (line, data) in rows {
        let outcome = match &data {
            Value::Object(object) => {
                let row = Row::new(object);
                match request.kind {
                    DataKind::Members => rows::apply_member(tables, &row, now),
                    DataKind::Events => rows::apply_event(tables, &row, now),
                    DataKind::Trains => rows::apply_train(tables, &row, &request.actor, now),
                }
            }
            _ => Err("row is not an object".to_string()),
        };
        match outcome {
            Ok(Applied::Created) => created += 1,
            Ok(Applied::Updated) => updated += 1,
            Err(error) => errors.push(RowError { line, error, data }),
        }
    }

    let success_count = created + updated;
    let error_count = errors.len();
    let reported = errors.iter().take(MAX_REPORTED_ERRORS).cloned().collect();

    let log = tables.import_logs.insert_with(|id| ImportLog {
        id,
        kind: request.kind,
        format: request.format,
        file_name: request.file_name.clone(),
        actor: request.actor.clone(),
        at: now,
        success_count,
        error_count,
        errors,
    });
    let import_id = log.id;
    tables.trim_import_logs();
    tables.audit(AuditPayload::Import {
        import_id,
        kind: request.kind,
        actor: request.actor.clone(),
        success_count,
        error_count,
    });

    info!(
        import = %import_id,
        kind = %request.kind,
        success_count,
        error_count,
        "Import finished"
    );

    ImportReport {
        import_id,
        kind: request.kind,
        format: request.format,
        success_count,
        error_count,
        created,
        updated,
        errors: reported,
    }
}

/// Import logs, newest first.
pub fn history(tables: &Tables) -> Vec<ImportLog> {
    let mut logs: Vec<ImportLog> = tables.import_logs.values().cloned().collect();
    logs.reverse();
    logs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tables::MAX_IMPORT_LOGS;
    use crate::test_utils::{insert_train, utc};
    use crate::types::TrainStatus;
    use chrono::NaiveDate;

    fn request(kind: DataKind, format: FileFormat) -> ImportRequest {
        ImportRequest {
            kind,
            format,
            file_name: Some(format!("{kind}.{}", format.extension())),
            actor: "admin".into(),
        }
    }

    fn import(tables: &mut Tables, kind: DataKind, format: FileFormat, body: &str) -> ImportReport {
        let rows = parse_rows(format, body.as_bytes()).unwrap();
        apply_rows(tables, &request(kind, format), rows, utc(2026, 3, 1, 0, 0))
    }

    #[test]
    fn member_csv_with_missing_pseudo_reports_the_row() {
        let mut tables = Tables::default();
        let csv = "pseudo,level,power\nKestrel,30,1000\n,12,5\nOsprey,20,2000\n";

        let report = import(&mut tables, DataKind::Members, FileFormat::Csv, csv);

        assert_eq!(report.success_count, 2);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.errors[0].line, 3);
        assert_eq!(report.errors[0].error, "missing required field: pseudo");
        assert_eq!(report.errors[0].data["level"], "12");
        assert_eq!(tables.members.len(), 2);
    }

    #[test]
    fn power_with_thousands_separator_is_rejected_without_blocking_others() {
        let mut tables = Tables::default();
        let csv = "pseudo,power\nOsprey,\"2,000\"\nKestrel,3000\n";

        let report = import(&mut tables, DataKind::Members, FileFormat::Csv, csv);

        assert_eq!(report.success_count, 1);
        assert_eq!(report.errors[0].line, 2);
        assert!(tables.member_by_pseudo("kestrel").is_some());
    }

    #[test]
    fn reimport_updates_instead_of_duplicating() {
        let mut tables = Tables::default();
        let csv = "pseudo,level\nKestrel,30\n";
        import(&mut tables, DataKind::Members, FileFormat::Csv, csv);

        let report = import(
            &mut tables,
            DataKind::Members,
            FileFormat::Json,
            r#"[{"pseudo":"kestrel","level":31}]"#,
        );

        assert_eq!((report.created, report.updated), (0, 1));
        assert_eq!(tables.members.len(), 1);
    }

    #[test]
    fn response_errors_are_capped_but_log_keeps_all() {
        let mut tables = Tables::default();
        let items: Vec<Value> = (0..15).map(|_| serde_json::json!({"level": 1})).collect();
        let body = serde_json::to_string(&items).unwrap();

        let report = import(&mut tables, DataKind::Members, FileFormat::Json, &body);

        assert_eq!(report.error_count, 15);
        assert_eq!(report.errors.len(), MAX_REPORTED_ERRORS);
        assert_eq!(report.errors[9].line, 10);
        let log = tables.import_logs.get(report.import_id).unwrap();
        assert_eq!(log.errors.len(), 15);
    }

    #[test]
    fn non_object_json_rows_are_row_errors() {
        let mut tables = Tables::default();
        let report = import(
            &mut tables,
            DataKind::Events,
            FileFormat::Json,
            r#"[{"name":"Siege","startsAt":"2026-03-14T18:00:00Z"}, 7]"#,
        );
        assert_eq!(report.success_count, 1);
        assert_eq!(report.errors[0].line, 2);
        assert_eq!(report.errors[0].error, "row is not an object");
    }

    #[test]
    fn train_import_records_history_and_audit() {
        let mut tables = Tables::default();
        let csv = "date,departureTime\n2026-03-10,19:00\n";

        let report = import(&mut tables, DataKind::Trains, FileFormat::Csv, csv);

        assert_eq!(report.created, 1);
        let pending = tables.pending_audit();
        assert!(pending.iter().any(|p| p.train_history().is_some()));
        assert!(pending.iter().any(|p| matches!(p, AuditPayload::Import { .. })));
    }

    #[test]
    fn train_import_does_not_revive_a_cancelled_day() {
        let mut tables = Tables::default();
        let date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let cancelled = insert_train(&mut tables, date, "20:00", TrainStatus::Cancelled);
        let csv = "date,departureTime\n2026-03-10,18:00\n2026-03-11,19:00\n";

        let report = import(&mut tables, DataKind::Trains, FileFormat::Csv, csv);

        assert_eq!(report.success_count, 1);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.errors[0].line, 2);
        assert!(report.errors[0].error.contains("cancelled"));
        let train = tables.trains.get(cancelled).unwrap();
        assert_eq!(train.status, TrainStatus::Cancelled);
        assert_eq!(train.departure_time.to_string(), "20:00");
    }

    #[test]
    fn import_log_is_bounded() {
        let mut tables = Tables::default();
        for _ in 0..MAX_IMPORT_LOGS + 5 {
            import(&mut tables, DataKind::Members, FileFormat::Json, "[]");
        }
        assert_eq!(tables.import_logs.len(), MAX_IMPORT_LOGS);
        let newest = history(&tables);
        assert!(newest[0].id > newest[1].id);
    }

    #[test]
    fn unreadable_files_fail_as_a_whole() {
        assert!(matches!(
            parse_rows(FileFormat::Csv, b"\xff\xfe"),
            Err(ImportError::Encoding)
        ));
        assert!(matches!(
            parse_rows(FileFormat::Csv, b"a\n\"broken"),
            Err(ImportError::Csv(CsvError::UnterminatedQuote { line: 2 }))
        ));
        assert!(matches!(
            parse_rows(FileFormat::Json, b"nope"),
            Err(ImportError::Json(_))
        ));
    }
}
