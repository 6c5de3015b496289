//! CSV and JSON downloads of members, events and trains.
//!
//! Column names match what the importer reads, so an exported file can be
//! edited and imported back.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::csv::write_row;
use crate::ops::trains::{self, TrainQuery};
use crate::ops::{events, members};
use crate::store::Tables;
use crate::types::{AllianceEvent, DataKind, FileFormat, Member, TrainInstance};

const MEMBER_COLUMNS: [&str; 9] = [
    "id",
    "pseudo",
    "level",
    "power",
    "allianceRole",
    "specialty",
    "tags",
    "status",
    "notes",
];

const EVENT_COLUMNS: [&str; 6] = [
    "id",
    "name",
    "eventType",
    "description",
    "startsAt",
    "endsAt",
];

const TRAIN_COLUMNS: [&str; 10] = [
    "id",
    "date",
    "dayOfWeek",
    "departureTime",
    "realDepartureTime",
    "isRequired",
    "status",
    "isArchived",
    "conductor",
    "passengers",
];

/// A rendered download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub rows: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrainRow<'a> {
    #[serde(flatten)]
    train: &'a TrainInstance,
    conductor: Option<String>,
    passengers: usize,
}

pub fn export(
    tables: &Tables,
    kind: DataKind,
    format: FileFormat,
    now: DateTime<Utc>,
) -> Result<ExportFile, serde_json::Error> {
    let (body, rows) = match kind {
        DataKind::Members => {
            let members = members::list(tables, &Default::default());
            (render(&members, format, &MEMBER_COLUMNS, member_cells)?, members.len())
        }
        DataKind::Events => {
            let events = events::list(tables, &Default::default());
            (render(&events, format, &EVENT_COLUMNS, event_cells)?, events.len())
        }
        DataKind::Trains => {
            let views = trains::list(
                tables,
                &TrainQuery {
                    include_archived: true,
                    ..Default::default()
                },
            );
            let rows: Vec<TrainRow<'_>> = views
                .iter()
                .map(|v| TrainRow {
                    train: &v.train,
                    conductor: v.conductor.as_ref().map(|c| c.pseudo.clone()),
                    passengers: v.passenger_count,
                })
                .collect();
            (render(&rows, format, &TRAIN_COLUMNS, train_cells)?, rows.len())
        }
    };

    Ok(ExportFile {
        file_name: format!(
            "{kind}-{}.{}",
            now.date_naive().format("%Y-%m-%d"),
            format.extension()
        ),
        content_type: format.content_type(),
        body,
        rows,
    })
}

fn render<T: Serialize>(
    items: &[T],
    format: FileFormat,
    columns: &[&str],
    cells: fn(&T) -> Vec<String>,
) -> Result<Vec<u8>, serde_json::Error> {
    match format {
        FileFormat::Json => serde_json::to_vec_pretty(items),
        FileFormat::Csv => {
            let mut out = String::new();
            write_row(&mut out, columns);
            for item in items {
                write_row(&mut out, cells(item).as_slice());
            }
            Ok(out.into_bytes())
        }
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn member_cells(m: &Member) -> Vec<String> {
    vec![
        m.id.to_string(),
        m.pseudo.clone(),
        m.level.to_string(),
        m.power.to_string(),
        opt(&m.alliance_role),
        opt(&m.specialty),
        m.tags.join(";"),
        m.status.as_str().to_string(),
        opt(&m.notes),
    ]
}

fn event_cells(e: &AllianceEvent) -> Vec<String> {
    vec![
        e.id.to_string(),
        e.name.clone(),
        opt(&e.event_type),
        opt(&e.description),
        e.starts_at.to_rfc3339(),
        e.ends_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
    ]
}

fn train_cells(row: &TrainRow<'_>) -> Vec<String> {
    let t = row.train;
    vec![
        t.id.to_string(),
        t.date.to_string(),
        t.day_of_week.clone(),
        t.departure_time.to_string(),
        t.real_departure_time.to_string(),
        t.is_required.to_string(),
        t.status.to_string(),
        t.is_archived.to_string(),
        row.conductor.clone().unwrap_or_default(),
        row.passengers.to_string(),
    ]
}
