//! Member roster operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OpError, OpResult, clean, clean_tags, required};
use crate::store::Tables;
use crate::types::{HistoryAction, Member, MemberId, MemberStatus, TrainHistoryEntry};

/// Member fields accepted on create, update and import.
///
/// On update, absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberFields {
    pub pseudo: Option<String>,
    pub level: Option<u32>,
    pub power: Option<u64>,
    pub alliance_role: Option<String>,
    pub specialty: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<MemberStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberQuery {
    pub status: Option<MemberStatus>,
    /// Case-insensitive substring of the pseudo.
    pub search: Option<String>,
}

/// What deleting a member removed alongside it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRemoval {
    pub conductor_cleared: usize,
    pub passengers_removed: usize,
    pub vs_entries_removed: usize,
    pub roster_entries_removed: usize,
}

/// Lists members sorted by power (highest first), then pseudo.
pub fn list(tables: &Tables, query: &MemberQuery) -> Vec<Member> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut members: Vec<Member> = tables
        .members
        .values()
        .filter(|m| query.status.is_none_or(|s| m.status == s))
        .filter(|m| {
            needle
                .as_deref()
                .is_none_or(|n| m.pseudo.to_lowercase().contains(n))
        })
        .cloned()
        .collect();
    members.sort_by(|a, b| {
        b.power
            .cmp(&a.power)
            .then_with(|| a.pseudo.to_lowercase().cmp(&b.pseudo.to_lowercase()))
    });
    members
}

pub fn get(tables: &Tables, id: MemberId) -> OpResult<&Member> {
    tables
        .members
        .get(id)
        .ok_or_else(|| OpError::not_found("member", id))
}

pub fn create(tables: &mut Tables, fields: MemberFields, now: DateTime<Utc>) -> OpResult<Member> {
    let pseudo = required(fields.pseudo.clone(), "pseudo")?;
    ensure_pseudo_free(tables, &pseudo, None)?;

    let member = tables.members.insert_with(|id| Member {
        id,
        pseudo,
        level: fields.level.unwrap_or(1),
        power: fields.power.unwrap_or(0),
        alliance_role: clean(fields.alliance_role),
        specialty: clean(fields.specialty),
        tags: clean_tags(fields.tags.unwrap_or_default()),
        status: fields.status.unwrap_or_default(),
        notes: clean(fields.notes),
        created_at: now,
        updated_at: now,
    });
    Ok(member.clone())
}

pub fn update(
    tables: &mut Tables,
    id: MemberId,
    fields: MemberFields,
    now: DateTime<Utc>,
) -> OpResult<Member> {
    get(tables, id)?;
    let pseudo = match fields.pseudo {
        Some(p) => {
            let p = required(Some(p), "pseudo")?;
            ensure_pseudo_free(tables, &p, Some(id))?;
            Some(p)
        }
        None => None,
    };

    let member = tables
        .members
        .get_mut(id)
        .ok_or_else(|| OpError::not_found("member", id))?;
    if let Some(pseudo) = pseudo {
        member.pseudo = pseudo;
    }
    if let Some(level) = fields.level {
        member.level = level;
    }
    if let Some(power) = fields.power {
        member.power = power;
    }
    if fields.alliance_role.is_some() {
        member.alliance_role = clean(fields.alliance_role);
    }
    if fields.specialty.is_some() {
        member.specialty = clean(fields.specialty);
    }
    if let Some(tags) = fields.tags {
        member.tags = clean_tags(tags);
    }
    if let Some(status) = fields.status {
        member.status = status;
    }
    if fields.notes.is_some() {
        member.notes = clean(fields.notes);
    }
    member.updated_at = now;
    Ok(member.clone())
}

/// Creates the member or updates the one with the same pseudo
/// (case-insensitive). Returns the id and whether it was created.
pub fn upsert(
    tables: &mut Tables,
    fields: MemberFields,
    now: DateTime<Utc>,
) -> OpResult<(MemberId, bool)> {
    let pseudo = required(fields.pseudo.clone(), "pseudo")?;
    match tables.member_by_pseudo(&pseudo).map(|m| m.id) {
        Some(id) => {
            update(tables, id, fields, now)?;
            Ok((id, false))
        }
        None => Ok((create(tables, fields, now)?.id, true)),
    }
}

/// Deletes a member and every row referencing it.
pub fn delete(tables: &mut Tables, id: MemberId, actor: &str) -> OpResult<MemberRemoval> {
    let member = tables
        .members
        .remove(id)
        .ok_or_else(|| OpError::not_found("member", id))?;

    let mut removal = MemberRemoval::default();

    let mut cleared = Vec::new();
    for train in tables
        .trains
        .values_mut()
        .filter(|t| t.conductor_id == Some(id))
    {
        train.conductor_id = None;
        cleared.push(train.id);
    }
    removal.conductor_cleared = cleared.len();
    for train in cleared {
        tables.record_train(TrainHistoryEntry::new(
            HistoryAction::ConductorCleared,
            actor,
            Some(train),
            format!("conductor {} deleted", member.pseudo),
        ));
    }

    let before = tables.passengers.len();
    tables.passengers.retain(|p| p.passenger_id != id);
    removal.passengers_removed = before - tables.passengers.len();

    let before = tables.vs_participants.len();
    tables.vs_participants.retain(|p| p.member_id != id);
    removal.vs_entries_removed = before - tables.vs_participants.len();

    for storm in tables.desert_storms.values_mut() {
        let before = storm.roster.len();
        storm.roster.retain(|e| e.member_id != id);
        removal.roster_entries_removed += before - storm.roster.len();
    }

    Ok(removal)
}

fn ensure_pseudo_free(tables: &Tables, pseudo: &str, except: Option<MemberId>) -> OpResult<()> {
    match tables.member_by_pseudo(pseudo) {
        Some(other) if Some(other.id) != except => Err(OpError::conflict(format!(
            "pseudo {pseudo:?} is already taken"
        ))),
        _ => Ok(()),
    }
}
