//! Train administration and passenger registration.
//!
//! Every mutation here writes a train history row attributed to the acting
//! user; the scheduler's own changes live in [`crate::scheduler::jobs`].

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{OpError, OpResult};
use crate::scheduler::template::{day_name, template_for};
use crate::store::{AuditRecord, Tables};
use crate::types::train::real_departure_for;
use crate::types::{
    ClockTime, HistoryAction, MemberId, TrainHistoryEntry, TrainInstance, TrainInstanceId,
    TrainPassenger, TrainStatus,
};

/// Default number of history rows returned.
const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
    pub id: MemberId,
    pub pseudo: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainView {
    #[serde(flatten)]
    pub train: TrainInstance,
    pub conductor: Option<MemberRef>,
    pub passenger_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerView {
    pub member_id: MemberId,
    pub pseudo: Option<String>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainDetail {
    #[serde(flatten)]
    pub train: TrainInstance,
    pub conductor: Option<MemberRef>,
    pub passengers: Vec<PassengerView>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainQuery {
    #[serde(default)]
    pub include_archived: bool,
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

/// Admin change to a single train.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TrainAction {
    AssignConductor { member_id: MemberId },
    ClearConductor,
    ChangeDeparture { departure_time: ClockTime },
    Cancel,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub member_id: MemberId,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub train: Option<TrainInstanceId>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub seq: u64,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub entry: TrainHistoryEntry,
}

/// Lists trains in date order; archived ones only on request.
pub fn list(tables: &Tables, query: &TrainQuery) -> Vec<TrainView> {
    let mut trains: Vec<&TrainInstance> = tables
        .trains
        .values()
        .filter(|t| query.include_archived || !t.is_archived)
        .filter(|t| query.from.is_none_or(|from| t.date >= from))
        .filter(|t| query.until.is_none_or(|until| t.date <= until))
        .collect();
    trains.sort_by_key(|t| (t.date, t.id));
    trains.into_iter().map(|t| view(tables, t)).collect()
}

pub fn view(tables: &Tables, train: &TrainInstance) -> TrainView {
    TrainView {
        train: train.clone(),
        conductor: conductor_of(tables, train),
        passenger_count: tables.passengers_of(train.id).count(),
    }
}

pub fn get(tables: &Tables, id: TrainInstanceId) -> OpResult<&TrainInstance> {
    tables
        .trains
        .get(id)
        .ok_or_else(|| OpError::not_found("train", id))
}

pub fn detail(tables: &Tables, id: TrainInstanceId) -> OpResult<TrainDetail> {
    let train = get(tables, id)?;
    let mut passengers: Vec<PassengerView> = tables
        .passengers_of(id)
        .map(|p| PassengerView {
            member_id: p.passenger_id,
            pseudo: tables.members.get(p.passenger_id).map(|m| m.pseudo.clone()),
            joined_at: p.joined_at,
        })
        .collect();
    passengers.sort_by_key(|p| p.joined_at);

    Ok(TrainDetail {
        train: train.clone(),
        conductor: conductor_of(tables, train),
        passengers,
    })
}

/// The live train for a calendar day, if any.
pub fn for_date(tables: &Tables, date: NaiveDate) -> Option<&TrainInstance> {
    tables.trains.find(|t| t.date == date && !t.is_archived)
}

pub fn apply_action(
    tables: &mut Tables,
    id: TrainInstanceId,
    action: TrainAction,
    actor: &str,
    now: DateTime<Utc>,
) -> OpResult<TrainInstance> {
    let (history, details) = match &action {
        TrainAction::AssignConductor { member_id } => {
            let pseudo = tables
                .members
                .get(*member_id)
                .map(|m| m.pseudo.clone())
                .ok_or_else(|| OpError::validation(format!("unknown member {member_id}")))?;
            (HistoryAction::ConductorAssigned, format!("conductor: {pseudo}"))
        }
        TrainAction::ClearConductor => (HistoryAction::ConductorCleared, "conductor cleared".into()),
        TrainAction::ChangeDeparture { departure_time } => (
            HistoryAction::DepartureChanged,
            format!("departure: {departure_time}"),
        ),
        TrainAction::Cancel => (HistoryAction::Cancelled, "cancelled".into()),
    };

    let train = live_train_mut(tables, id)?;
    match action {
        TrainAction::AssignConductor { member_id } => {
            train.conductor_id = Some(member_id);
            train.updated_at = now;
        }
        TrainAction::ClearConductor => {
            train.conductor_id = None;
            train.updated_at = now;
        }
        TrainAction::ChangeDeparture { departure_time } => {
            if train.status == TrainStatus::Cancelled {
                return Err(OpError::conflict("train is cancelled"));
            }
            train.reschedule(departure_time, now);
        }
        TrainAction::Cancel => {
            if train.status == TrainStatus::Cancelled {
                return Err(OpError::conflict("train is already cancelled"));
            }
            train.status = TrainStatus::Cancelled;
            train.updated_at = now;
        }
    }
    let updated = train.clone();

    tables.record_train(TrainHistoryEntry::new(history, actor, Some(id), details));
    Ok(updated)
}

/// Registers a member on a train that is still open.
pub fn join(
    tables: &mut Tables,
    id: TrainInstanceId,
    member_id: MemberId,
    actor: &str,
    now: DateTime<Utc>,
) -> OpResult<TrainPassenger> {
    let train = get(tables, id)?;
    if train.is_archived || !train.status.accepts_passengers() {
        return Err(OpError::conflict(format!(
            "train {id} is {} and not accepting passengers",
            train.status
        )));
    }
    let pseudo = tables
        .members
        .get(member_id)
        .map(|m| m.pseudo.clone())
        .ok_or_else(|| OpError::validation(format!("unknown member {member_id}")))?;
    if tables.passengers_of(id).any(|p| p.passenger_id == member_id) {
        return Err(OpError::conflict(format!("{pseudo} is already on train {id}")));
    }

    let passenger = TrainPassenger {
        train_instance_id: id,
        passenger_id: member_id,
        joined_at: now,
    };
    tables.passengers.push(passenger.clone());
    tables.record_train(TrainHistoryEntry::new(
        HistoryAction::PassengerJoined,
        actor,
        Some(id),
        format!("{pseudo} joined"),
    ));
    Ok(passenger)
}

pub fn leave(
    tables: &mut Tables,
    id: TrainInstanceId,
    member_id: MemberId,
    actor: &str,
) -> OpResult<()> {
    get(tables, id)?;
    let position = tables
        .passengers
        .iter()
        .position(|p| p.train_instance_id == id && p.passenger_id == member_id)
        .ok_or_else(|| OpError::not_found("passenger", member_id))?;
    tables.passengers.remove(position);

    let who = tables
        .members
        .get(member_id)
        .map(|m| m.pseudo.clone())
        .unwrap_or_else(|| format!("member {member_id}"));
    tables.record_train(TrainHistoryEntry::new(
        HistoryAction::PassengerLeft,
        actor,
        Some(id),
        format!("{who} left"),
    ));
    Ok(())
}

/// Creates or updates the live train for `date`.
///
/// A new train takes its required flag from the weekly template. An
/// existing one is rescheduled only if the departure time changed. Returns
/// the id and whether it was created. A cancelled train stays cancelled:
/// upserting onto it is a conflict.
pub fn upsert_for_date(
    tables: &mut Tables,
    date: NaiveDate,
    departure_time: ClockTime,
    conductor: Option<MemberId>,
    actor: &str,
    now: DateTime<Utc>,
) -> OpResult<(TrainInstanceId, bool)> {
    let existing = for_date(tables, date).map(|t| t.id);
    let (id, created) = match existing {
        Some(id) => {
            let train = live_train_mut(tables, id)?;
            if train.status == TrainStatus::Cancelled {
                return Err(OpError::conflict(format!("train {id} is cancelled")));
            }
            if train.departure_time != departure_time {
                train.reschedule(departure_time, now);
            }
            if conductor.is_some() {
                train.conductor_id = conductor;
            }
            train.updated_at = now;
            (id, false)
        }
        None => {
            let weekday = date.weekday();
            let train = tables.trains.insert_with(|id| TrainInstance {
                id,
                date,
                day_of_week: day_name(weekday).to_string(),
                departure_time,
                real_departure_time: real_departure_for(departure_time),
                is_required: template_for(weekday).is_required,
                status: TrainStatus::Scheduled,
                is_archived: false,
                conductor_id: conductor,
                created_at: now,
                updated_at: now,
            });
            (train.id, true)
        }
    };

    tables.record_train(TrainHistoryEntry::new(
        HistoryAction::Imported,
        actor,
        Some(id),
        format!(
            "{} {date} departs {departure_time}",
            if created { "created" } else { "updated" }
        ),
    ));
    Ok((id, created))
}

/// Train history rows from the audit log, newest first.
pub fn history(records: &[AuditRecord], query: &HistoryQuery) -> Vec<HistoryView> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    records
        .iter()
        .rev()
        .filter_map(|r| r.payload.train_history().map(|e| (r, e)))
        .filter(|(_, e)| query.train.is_none_or(|t| e.target == Some(t)))
        .take(limit)
        .map(|(r, e)| HistoryView {
            seq: r.seq,
            at: r.ts,
            entry: e.clone(),
        })
        .collect()
}

fn live_train_mut(tables: &mut Tables, id: TrainInstanceId) -> OpResult<&mut TrainInstance> {
    let train = tables
        .trains
        .get_mut(id)
        .ok_or_else(|| OpError::not_found("train", id))?;
    if train.is_archived {
        return Err(OpError::conflict(format!("train {id} is archived")));
    }
    Ok(train)
}

fn conductor_of(tables: &Tables, train: &TrainInstance) -> Option<MemberRef> {
    let id = train.conductor_id?;
    tables.members.get(id).map(|m| MemberRef {
        id,
        pseudo: m.pseudo.clone(),
    })
}
