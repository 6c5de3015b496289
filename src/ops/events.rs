//! Alliance calendar operations.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{OpError, OpResult, clean, required};
use crate::store::Tables;
use crate::types::{AllianceEvent, EventId};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFields {
    pub name: Option<String>,
    pub event_type: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub event_type: Option<String>,
}

/// Lists events in start order.
pub fn list(tables: &Tables, query: &EventQuery) -> Vec<AllianceEvent> {
    let mut events: Vec<AllianceEvent> = tables
        .events
        .values()
        .filter(|e| query.from.is_none_or(|from| e.starts_at >= from))
        .filter(|e| query.until.is_none_or(|until| e.starts_at < until))
        .filter(|e| {
            query
                .event_type
                .as_deref()
                .is_none_or(|t| e.event_type.as_deref() == Some(t))
        })
        .cloned()
        .collect();
    events.sort_by_key(|e| (e.starts_at, e.id));
    events
}

/// Events starting in `[from, until)`, in start order.
pub fn upcoming(
    tables: &Tables,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Vec<AllianceEvent> {
    let mut events: Vec<AllianceEvent> = tables
        .events
        .values()
        .filter(|e| e.starts_between(from, until))
        .cloned()
        .collect();
    events.sort_by_key(|e| (e.starts_at, e.id));
    events
}

pub fn get(tables: &Tables, id: EventId) -> OpResult<&AllianceEvent> {
    tables
        .events
        .get(id)
        .ok_or_else(|| OpError::not_found("event", id))
}

pub fn create(
    tables: &mut Tables,
    fields: EventFields,
    now: DateTime<Utc>,
) -> OpResult<AllianceEvent> {
    let name = required(fields.name, "name")?;
    let starts_at = fields
        .starts_at
        .ok_or_else(|| OpError::validation("startsAt is required"))?;
    check_range(starts_at, fields.ends_at)?;

    let event = tables.events.insert_with(|id| AllianceEvent {
        id,
        name,
        event_type: clean(fields.event_type),
        description: clean(fields.description),
        starts_at,
        ends_at: fields.ends_at,
        created_at: now,
        updated_at: now,
    });
    Ok(event.clone())
}

pub fn update(
    tables: &mut Tables,
    id: EventId,
    fields: EventFields,
    now: DateTime<Utc>,
) -> OpResult<AllianceEvent> {
    let event = tables
        .events
        .get_mut(id)
        .ok_or_else(|| OpError::not_found("event", id))?;

    if fields.name.is_some() {
        event.name = required(fields.name, "name")?;
    }
    if fields.event_type.is_some() {
        event.event_type = clean(fields.event_type);
    }
    if fields.description.is_some() {
        event.description = clean(fields.description);
    }
    if let Some(starts_at) = fields.starts_at {
        event.starts_at = starts_at;
    }
    if fields.ends_at.is_some() {
        event.ends_at = fields.ends_at;
    }
    check_range(event.starts_at, event.ends_at)?;
    event.updated_at = now;
    Ok(event.clone())
}

pub fn delete(tables: &mut Tables, id: EventId) -> OpResult<AllianceEvent> {
    tables
        .events
        .remove(id)
        .ok_or_else(|| OpError::not_found("event", id))
}

fn check_range(starts_at: DateTime<Utc>, ends_at: Option<DateTime<Utc>>) -> OpResult<()> {
    match ends_at {
        Some(end) if end < starts_at => Err(OpError::validation("endsAt is before startsAt")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::utc;

    fn fields(name: &str, starts_at: DateTime<Utc>) -> EventFields {
        EventFields {
            name: Some(name.to_string()),
            starts_at: Some(starts_at),
            ..Default::default()
        }
    }

    #[test]
    fn name_and_start_are_required() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 1, 0, 0);

        let err = create(&mut tables, EventFields::default(), now).unwrap_err();
        assert_eq!(err.to_string(), "name is required");

        let err = create(
            &mut tables,
            EventFields {
                name: Some("Zombie siege".into()),
                ..Default::default()
            },
            now,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "startsAt is required");
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 1, 0, 0);
        let event = create(&mut tables, fields("Siege", now), now).unwrap();

        let result = update(
            &mut tables,
            event.id,
            EventFields {
                ends_at: Some(now - chrono::Duration::hours(1)),
                ..Default::default()
            },
            now,
        );
        assert!(matches!(result, Err(OpError::Validation(_))));
    }

    #[test]
    fn upcoming_is_half_open_and_ordered() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 1, 0, 0);
        create(&mut tables, fields("later", utc(2026, 3, 5, 0, 0)), now).unwrap();
        create(&mut tables, fields("sooner", utc(2026, 3, 2, 0, 0)), now).unwrap();
        create(&mut tables, fields("edge", utc(2026, 3, 8, 0, 0)), now).unwrap();
        create(&mut tables, fields("past", utc(2026, 2, 28, 0, 0)), now).unwrap();

        let names: Vec<_> = upcoming(&tables, now, utc(2026, 3, 8, 0, 0))
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["sooner", "later"]);
    }
}
