//! VS week tracking: weekly matchups, daily scores and member points.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::{OpError, OpResult, clean};
use crate::store::Tables;
use crate::types::vs::VS_DAYS;
use crate::types::{MatchResult, MemberId, VsDay, VsParticipant, VsWeek, VsWeekId};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsWeekFields {
    pub year: Option<i32>,
    pub week_number: Option<u32>,
    pub opponent: Option<String>,
    /// Defaults to the Monday of the ISO week.
    pub start_date: Option<NaiveDate>,
    pub result: Option<MatchResult>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayScores {
    pub our_score: u64,
    pub their_score: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantPoints {
    pub points: [u64; VS_DAYS],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VsWeekSummary {
    #[serde(flatten)]
    pub week: VsWeek,
    pub our_score: u64,
    pub their_score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub member_id: MemberId,
    pub pseudo: Option<String>,
    pub points: [u64; VS_DAYS],
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VsWeekDetail {
    #[serde(flatten)]
    pub summary: VsWeekSummary,
    pub days: Vec<VsDay>,
    /// Highest total first.
    pub participants: Vec<ParticipantView>,
}

/// Lists weeks, most recent first.
pub fn list(tables: &Tables, query: &VsQuery) -> Vec<VsWeekSummary> {
    let mut weeks: Vec<&VsWeek> = tables
        .vs_weeks
        .values()
        .filter(|w| query.year.is_none_or(|y| w.year == y))
        .collect();
    weeks.sort_by(|a, b| (b.year, b.week_number).cmp(&(a.year, a.week_number)));
    weeks.into_iter().map(|w| summary(tables, w)).collect()
}

pub fn summary(tables: &Tables, week: &VsWeek) -> VsWeekSummary {
    let (our_score, their_score) = tables
        .vs_days
        .iter()
        .filter(|d| d.week_id == week.id)
        .fold((0u64, 0u64), |(ours, theirs), d| {
            (
                ours.saturating_add(d.our_score),
                theirs.saturating_add(d.their_score),
            )
        });
    VsWeekSummary {
        week: week.clone(),
        our_score,
        their_score,
    }
}

pub fn get(tables: &Tables, id: VsWeekId) -> OpResult<&VsWeek> {
    tables
        .vs_weeks
        .get(id)
        .ok_or_else(|| OpError::not_found("VS week", id))
}

pub fn detail(tables: &Tables, id: VsWeekId) -> OpResult<VsWeekDetail> {
    let week = get(tables, id)?;

    let mut days: Vec<VsDay> = tables
        .vs_days
        .iter()
        .filter(|d| d.week_id == id)
        .cloned()
        .collect();
    days.sort_by_key(|d| d.day);

    let mut participants: Vec<ParticipantView> = tables
        .vs_participants
        .iter()
        .filter(|p| p.week_id == id)
        .map(|p| ParticipantView {
            member_id: p.member_id,
            pseudo: tables.members.get(p.member_id).map(|m| m.pseudo.clone()),
            points: p.points,
            total: p.total(),
        })
        .collect();
    participants.sort_by(|a, b| b.total.cmp(&a.total).then(a.member_id.cmp(&b.member_id)));

    Ok(VsWeekDetail {
        summary: summary(tables, week),
        days,
        participants,
    })
}

/// The week covering `today`, or failing that the most recent one.
pub fn current(tables: &Tables, today: NaiveDate) -> Option<VsWeekSummary> {
    let iso = today.iso_week();
    tables
        .vs_weeks
        .find(|w| w.year == iso.year() && w.week_number == iso.week())
        .or_else(|| {
            tables
                .vs_weeks
                .values()
                .max_by_key(|w| (w.year, w.week_number))
        })
        .map(|w| summary(tables, w))
}

pub fn create(tables: &mut Tables, fields: VsWeekFields, now: DateTime<Utc>) -> OpResult<VsWeek> {
    let year = fields
        .year
        .ok_or_else(|| OpError::validation("year is required"))?;
    let week_number = fields
        .week_number
        .ok_or_else(|| OpError::validation("weekNumber is required"))?;
    let monday = week_start(year, week_number)?;
    ensure_week_free(tables, year, week_number, None)?;

    let week = tables.vs_weeks.insert_with(|id| VsWeek {
        id,
        year,
        week_number,
        opponent: clean(fields.opponent),
        start_date: fields.start_date.unwrap_or(monday),
        result: fields.result.unwrap_or_default(),
        notes: clean(fields.notes),
        created_at: now,
        updated_at: now,
    });
    Ok(week.clone())
}

pub fn update(
    tables: &mut Tables,
    id: VsWeekId,
    fields: VsWeekFields,
    now: DateTime<Utc>,
) -> OpResult<VsWeek> {
    let existing = get(tables, id)?;
    let year = fields.year.unwrap_or(existing.year);
    let week_number = fields.week_number.unwrap_or(existing.week_number);
    let moved = (year, week_number) != (existing.year, existing.week_number);
    let monday = week_start(year, week_number)?;
    if moved {
        ensure_week_free(tables, year, week_number, Some(id))?;
    }

    let week = tables
        .vs_weeks
        .get_mut(id)
        .ok_or_else(|| OpError::not_found("VS week", id))?;
    week.year = year;
    week.week_number = week_number;
    if fields.opponent.is_some() {
        week.opponent = clean(fields.opponent);
    }
    match fields.start_date {
        Some(start_date) => week.start_date = start_date,
        None if moved => week.start_date = monday,
        None => {}
    }
    if let Some(result) = fields.result {
        week.result = result;
    }
    if fields.notes.is_some() {
        week.notes = clean(fields.notes);
    }
    week.updated_at = now;
    Ok(week.clone())
}

/// Deletes a week together with its days and participant rows.
pub fn delete(tables: &mut Tables, id: VsWeekId) -> OpResult<VsWeek> {
    let week = tables
        .vs_weeks
        .remove(id)
        .ok_or_else(|| OpError::not_found("VS week", id))?;
    tables.vs_days.retain(|d| d.week_id != id);
    tables.vs_participants.retain(|p| p.week_id != id);
    Ok(week)
}

/// Records the scores of one day (1 to 6) of a week.
pub fn set_day(
    tables: &mut Tables,
    id: VsWeekId,
    day: u8,
    scores: DayScores,
    now: DateTime<Utc>,
) -> OpResult<VsDay> {
    if !(1..=VS_DAYS as u8).contains(&day) {
        return Err(OpError::validation(format!(
            "day must be between 1 and {VS_DAYS}"
        )));
    }
    touch(tables, id, now)?;

    let row = VsDay {
        week_id: id,
        day,
        our_score: scores.our_score,
        their_score: scores.their_score,
    };
    match tables
        .vs_days
        .iter_mut()
        .find(|d| d.week_id == id && d.day == day)
    {
        Some(existing) => *existing = row.clone(),
        None => tables.vs_days.push(row.clone()),
    }
    Ok(row)
}

/// Sets a member's per-day points for a week.
pub fn set_participant(
    tables: &mut Tables,
    id: VsWeekId,
    member_id: MemberId,
    points: ParticipantPoints,
    now: DateTime<Utc>,
) -> OpResult<VsParticipant> {
    if !tables.members.contains(member_id) {
        return Err(OpError::validation(format!("unknown member {member_id}")));
    }
    touch(tables, id, now)?;

    let row = VsParticipant {
        week_id: id,
        member_id,
        points: points.points,
    };
    match tables
        .vs_participants
        .iter_mut()
        .find(|p| p.week_id == id && p.member_id == member_id)
    {
        Some(existing) => *existing = row.clone(),
        None => tables.vs_participants.push(row.clone()),
    }
    Ok(row)
}

fn touch(tables: &mut Tables, id: VsWeekId, now: DateTime<Utc>) -> OpResult<()> {
    let week = tables
        .vs_weeks
        .get_mut(id)
        .ok_or_else(|| OpError::not_found("VS week", id))?;
    week.updated_at = now;
    Ok(())
}

fn week_start(year: i32, week_number: u32) -> OpResult<NaiveDate> {
    NaiveDate::from_isoywd_opt(year, week_number, Weekday::Mon).ok_or_else(|| {
        OpError::validation(format!("{year} has no ISO week {week_number}"))
    })
}

fn ensure_week_free(
    tables: &Tables,
    year: i32,
    week_number: u32,
    except: Option<VsWeekId>,
) -> OpResult<()> {
    match tables
        .vs_weeks
        .find(|w| w.year == year && w.week_number == week_number)
    {
        Some(other) if Some(other.id) != except => Err(OpError::conflict(format!(
            "week {week_number} of {year} already exists"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{insert_member, utc};

    fn week(year: i32, n: u32) -> VsWeekFields {
        VsWeekFields {
            year: Some(year),
            week_number: Some(n),
            ..Default::default()
        }
    }

    #[test]
    fn create_defaults_start_to_iso_monday() {
        let mut tables = Tables::default();
        let w = create(&mut tables, week(2026, 11), utc(2026, 3, 9, 0, 0)).unwrap();
        assert_eq!(w.start_date, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        assert_eq!(w.result, MatchResult::Pending);
    }

    #[test]
    fn week_numbers_are_validated_and_unique() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 9, 0, 0);
        create(&mut tables, week(2026, 11), now).unwrap();

        assert!(matches!(
            create(&mut tables, week(2026, 11), now),
            Err(OpError::Conflict(_))
        ));
        assert!(matches!(
            create(&mut tables, week(2026, 0), now),
            Err(OpError::Validation(_))
        ));
        assert!(matches!(
            create(&mut tables, week(2026, 54), now),
            Err(OpError::Validation(_))
        ));
        create(&mut tables, week(2025, 11), now).unwrap();
    }

    #[test]
    fn totals_are_summed_from_days() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 9, 0, 0);
        let w = create(&mut tables, week(2026, 11), now).unwrap();

        set_day(&mut tables, w.id, 1, DayScores { our_score: 10, their_score: 4 }, now).unwrap();
        set_day(&mut tables, w.id, 2, DayScores { our_score: 3, their_score: 9 }, now).unwrap();
        set_day(&mut tables, w.id, 1, DayScores { our_score: 12, their_score: 4 }, now).unwrap();

        let d = detail(&tables, w.id).unwrap();
        assert_eq!(d.summary.our_score, 15);
        assert_eq!(d.summary.their_score, 13);
        assert_eq!(d.days.iter().map(|d| d.day).collect::<Vec<_>>(), [1, 2]);
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 9, 0, 0);
        let a = insert_member(&mut tables, "Alpha");
        let w = create(&mut tables, week(2026, 11), now).unwrap();

        let max = DayScores { our_score: u64::MAX, their_score: u64::MAX };
        set_day(&mut tables, w.id, 1, max, now).unwrap();
        set_day(&mut tables, w.id, 2, max, now).unwrap();
        set_participant(
            &mut tables,
            w.id,
            a,
            ParticipantPoints { points: [u64::MAX, u64::MAX, 0, 0, 0, 0] },
            now,
        )
        .unwrap();

        let d = detail(&tables, w.id).unwrap();
        assert_eq!(d.summary.our_score, u64::MAX);
        assert_eq!(d.summary.their_score, u64::MAX);
        assert_eq!(d.participants[0].total, u64::MAX);
        assert_eq!(list(&tables, &VsQuery::default())[0].our_score, u64::MAX);
    }

    #[test]
    fn day_out_of_range_is_rejected() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 9, 0, 0);
        let w = create(&mut tables, week(2026, 11), now).unwrap();
        for day in [0, 7] {
            assert!(matches!(
                set_day(&mut tables, w.id, day, DayScores { our_score: 1, their_score: 1 }, now),
                Err(OpError::Validation(_))
            ));
        }
    }

    #[test]
    fn participants_rank_by_total() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 9, 0, 0);
        let a = insert_member(&mut tables, "Alpha");
        let b = insert_member(&mut tables, "Bravo");
        let w = create(&mut tables, week(2026, 11), now).unwrap();

        set_participant(&mut tables, w.id, a, ParticipantPoints { points: [1, 1, 1, 1, 1, 1] }, now)
            .unwrap();
        set_participant(&mut tables, w.id, b, ParticipantPoints { points: [0, 0, 0, 0, 0, 50] }, now)
            .unwrap();

        let d = detail(&tables, w.id).unwrap();
        let ranking: Vec<_> = d.participants.iter().map(|p| (p.member_id, p.total)).collect();
        assert_eq!(ranking, [(b, 50), (a, 6)]);

        assert!(matches!(
            set_participant(&mut tables, w.id, MemberId(99), ParticipantPoints { points: [0; 6] }, now),
            Err(OpError::Validation(_))
        ));
    }

    #[test]
    fn moving_a_week_recomputes_its_start() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 9, 0, 0);
        let w = create(&mut tables, week(2026, 11), now).unwrap();

        let moved = update(&mut tables, w.id, week(2026, 12), now).unwrap();
        assert_eq!(moved.start_date, NaiveDate::from_ymd_opt(2026, 3, 16).unwrap());

        let explicit = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();
        let pinned = update(
            &mut tables,
            w.id,
            VsWeekFields { start_date: Some(explicit), ..week(2026, 13) },
            now,
        )
        .unwrap();
        assert_eq!(pinned.start_date, explicit);

        let renamed = update(
            &mut tables,
            w.id,
            VsWeekFields { opponent: Some("Nova".into()), ..Default::default() },
            now,
        )
        .unwrap();
        assert_eq!(renamed.start_date, explicit);
    }

    #[test]
    fn delete_removes_children() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 9, 0, 0);
        let m = insert_member(&mut tables, "Alpha");
        let w = create(&mut tables, week(2026, 11), now).unwrap();
        set_day(&mut tables, w.id, 3, DayScores { our_score: 1, their_score: 2 }, now).unwrap();
        set_participant(&mut tables, w.id, m, ParticipantPoints { points: [0; 6] }, now).unwrap();

        delete(&mut tables, w.id).unwrap();

        assert!(tables.vs_days.is_empty());
        assert!(tables.vs_participants.is_empty());
    }

    #[test]
    fn current_prefers_this_iso_week() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 9, 0, 0);
        create(&mut tables, week(2026, 12), now).unwrap();
        create(&mut tables, week(2026, 11), now).unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
        assert_eq!(current(&tables, today).unwrap().week.week_number, 11);

        let later = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert_eq!(current(&tables, later).unwrap().week.week_number, 12);
    }
}
