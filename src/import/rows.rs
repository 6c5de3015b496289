//! Mapping of loosely-typed import rows onto domain operations.
//!
//! Rows arrive as JSON objects whatever the file format: CSV cells are
//! strings, JSON values may be strings, numbers or arrays. Column names are
//! matched ignoring case, spaces, dashes and underscores, so `allianceRole`,
//! `alliance_role` and `Alliance Role` all name the same field.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::ops::events::{self, EventFields};
use crate::ops::members::{self, MemberFields};
use crate::ops::trains;
use crate::store::Tables;
use crate::types::{ClockTime, MemberStatus};

/// Outcome of one successfully applied row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Created,
    Updated,
}

impl From<bool> for Applied {
    fn from(created: bool) -> Self {
        if created {
            Applied::Created
        } else {
            Applied::Updated
        }
    }
}

pub type RowResult = Result<Applied, String>;

pub struct Row<'a>(&'a Map<String, Value>);

impl<'a> Row<'a> {
    pub fn new(object: &'a Map<String, Value>) -> Self {
        Row(object)
    }

    fn raw(&self, names: &[&str]) -> Option<&'a Value> {
        let wanted: Vec<String> = names.iter().map(|n| normalize(n)).collect();
        self.0
            .iter()
            .find(|(k, _)| wanted.contains(&normalize(k)))
            .map(|(_, v)| v)
    }

    /// Trimmed text, or `None` when absent, null or blank.
    fn text(&self, names: &[&str]) -> Option<String> {
        let text = match self.raw(names)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    fn required(&self, names: &[&str]) -> Result<String, String> {
        self.text(names)
            .ok_or_else(|| format!("missing required field: {}", names[0]))
    }

    fn parsed<T: FromStr>(&self, names: &[&str]) -> Result<Option<T>, String> {
        match self.text(names) {
            Some(text) => text
                .replace([' ', '_'], "")
                .parse()
                .map(Some)
                .map_err(|_| format!("invalid {}: {text:?}", names[0])),
            None => Ok(None),
        }
    }

    /// A list given as a JSON array or as text separated by `;`, `|` or `,`.
    fn list(&self, names: &[&str]) -> Option<Vec<String>> {
        match self.raw(names)? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            Value::String(s) => Some(
                s.split([';', '|', ','])
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        }
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn apply_member(tables: &mut Tables, row: &Row<'_>, now: DateTime<Utc>) -> RowResult {
    let pseudo = row.required(&["pseudo", "name"])?;
    let status = match row.text(&["status"]) {
        Some(s) => Some(MemberStatus::parse_loose(&s).ok_or_else(|| format!("invalid status: {s:?}"))?),
        None => None,
    };
    let fields = MemberFields {
        pseudo: Some(pseudo),
        level: row.parsed(&["level"])?,
        power: row.parsed(&["power"])?,
        alliance_role: row.text(&["allianceRole", "role", "rank"]),
        specialty: row.text(&["specialty"]),
        tags: row.list(&["tags"]),
        status,
        notes: row.text(&["notes"]),
    };
    members::upsert(tables, fields, now)
        .map(|(_, created)| created.into())
        .map_err(|e| e.to_string())
}

pub fn apply_event(tables: &mut Tables, row: &Row<'_>, now: DateTime<Utc>) -> RowResult {
    let name = row.required(&["name", "title"])?;
    let starts_at = parse_instant(&row.required(&["startsAt", "start", "date"])?)
        .ok_or("invalid startsAt: expected RFC 3339, YYYY-MM-DD HH:MM or YYYY-MM-DD")?;
    let ends_at = match row.text(&["endsAt", "end"]) {
        Some(text) => Some(parse_instant(&text).ok_or("invalid endsAt")?),
        None => None,
    };
    let fields = EventFields {
        name: Some(name),
        event_type: row.text(&["eventType", "type"]),
        description: row.text(&["description"]),
        starts_at: Some(starts_at),
        ends_at,
    };
    events::create(tables, fields, now)
        .map(|_| Applied::Created)
        .map_err(|e| e.to_string())
}

pub fn apply_train(
    tables: &mut Tables,
    row: &Row<'_>,
    actor: &str,
    now: DateTime<Utc>,
) -> RowResult {
    let date_text = row.required(&["date"])?;
    let date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d")
        .map_err(|_| format!("invalid date {date_text:?}: expected YYYY-MM-DD"))?;
    let departure: ClockTime = row
        .required(&["departureTime", "departure"])?
        .parse()
        .map_err(|e: crate::types::InvalidClockTime| e.to_string())?;
    let conductor = match row.text(&["conductor", "conductorPseudo"]) {
        Some(pseudo) => Some(
            tables
                .member_by_pseudo(&pseudo)
                .map(|m| m.id)
                .ok_or_else(|| format!("unknown conductor: {pseudo}"))?,
        ),
        None => None,
    };
    trains::upsert_for_date(tables, date, departure, conductor, actor, now)
        .map(|(_, created)| created.into())
        .map_err(|e| e.to_string())
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]` (UTC) or a bare date (midnight UTC).
fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{insert_member, utc};
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn column_names_are_matched_loosely() {
        let map = object(json!({"Alliance Role": "R4", "POWER": "1 200 000"}));
        let row = Row::new(&map);
        assert_eq!(row.text(&["allianceRole"]), Some("R4".into()));
        assert_eq!(row.parsed::<u64>(&["power"]), Ok(Some(1_200_000)));
    }

    #[test]
    fn member_row_upserts() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 1, 0, 0);

        let map = object(json!({"pseudo": "Kestrel", "level": "30", "tags": "whale;f2p"}));
        assert_eq!(apply_member(&mut tables, &Row::new(&map), now), Ok(Applied::Created));
        let map = object(json!({"pseudo": "KESTREL", "level": 31}));
        assert_eq!(apply_member(&mut tables, &Row::new(&map), now), Ok(Applied::Updated));

        let member = tables.members.values().next().unwrap();
        assert_eq!(member.level, 31);
        assert_eq!(member.tags, ["whale", "f2p"]);
    }

    #[test]
    fn member_row_errors_are_descriptive() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 1, 0, 0);

        let map = object(json!({"level": "3"}));
        assert_eq!(
            apply_member(&mut tables, &Row::new(&map), now),
            Err("missing required field: pseudo".into())
        );
        let map = object(json!({"pseudo": "x", "level": "high"}));
        assert_eq!(
            apply_member(&mut tables, &Row::new(&map), now),
            Err("invalid level: \"high\"".into())
        );
        assert!(tables.members.is_empty());
    }

    #[test]
    fn event_row_accepts_several_time_formats() {
        for (text, expected) in [
            ("2026-03-14T18:00:00Z", utc(2026, 3, 14, 18, 0)),
            ("2026-03-14T20:00:00+02:00", utc(2026, 3, 14, 18, 0)),
            ("2026-03-14 18:00", utc(2026, 3, 14, 18, 0)),
            ("2026-03-14", utc(2026, 3, 14, 0, 0)),
        ] {
            assert_eq!(parse_instant(text), Some(expected), "{text}");
        }
        assert_eq!(parse_instant("next friday"), None);
    }

    #[test]
    fn train_row_resolves_conductor_by_pseudo() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 1, 0, 0);
        let kestrel = insert_member(&mut tables, "Kestrel");

        let map = object(json!({"date": "2026-03-10", "departureTime": "19:30", "conductor": "kestrel"}));
        assert_eq!(
            apply_train(&mut tables, &Row::new(&map), "admin", now),
            Ok(Applied::Created)
        );
        let train = tables.trains.values().next().unwrap();
        assert_eq!(train.conductor_id, Some(kestrel));
        assert_eq!(train.real_departure_time.to_string(), "23:30");

        let map = object(json!({"date": "2026-03-11", "departureTime": "19:30", "conductor": "ghost"}));
        assert_eq!(
            apply_train(&mut tables, &Row::new(&map), "admin", now),
            Err("unknown conductor: ghost".into())
        );
        let map = object(json!({"date": "10/03/2026", "departureTime": "19:30"}));
        assert!(apply_train(&mut tables, &Row::new(&map), "admin", now).is_err());
    }
}
