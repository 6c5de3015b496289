//! Scheduler jobs over the train tables.
//!
//! Each job is a synchronous function over [`Tables`] taking the current
//! instant explicitly, so it can run inside a store transaction and be
//! tested against any point in time. Every change queues a train history
//! row attributed to the system actor.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::config::MAX_LOOKAHEAD_DAYS;
use super::template::{day_name, template_for};
use super::transitions::next_status;
use crate::store::Tables;
use crate::types::train::real_departure_for;
use crate::types::{
    HistoryAction, TrainHistoryEntry, TrainInstance, TrainInstanceId, TrainStatus,
};

/// Passenger rows are kept this long after their train's day starts.
pub const PASSENGER_RETENTION: TimeDelta = TimeDelta::hours(24);

/// Counts of rows touched by one maintenance run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReport {
    pub archived: usize,
    pub generated: usize,
    pub status_changes: usize,
    pub passengers_removed: usize,
}

/// Creates the trains for today and the next `days_ahead` days.
///
/// Days that already have an instance are skipped, so repeated calls never
/// create a second train for the same day. `days_ahead` is capped at
/// [`MAX_LOOKAHEAD_DAYS`].
#[instrument(skip(tables), fields(today = %now.date_naive()))]
pub fn generate_instances(tables: &mut Tables, days_ahead: u32, now: DateTime<Utc>) -> usize {
    let days_ahead = days_ahead.min(MAX_LOOKAHEAD_DAYS);
    let today = now.date_naive();
    let existing: HashSet<NaiveDate> = tables.trains.values().map(|t| t.date).collect();
    let mut created = Vec::new();

    for offset in 0..=days_ahead {
        let date = today + Duration::days(offset as i64);
        if existing.contains(&date) {
            continue;
        }

        let weekday = date.weekday();
        let template = template_for(weekday);
        let train = tables.trains.insert_with(|id| TrainInstance {
            id,
            date,
            day_of_week: day_name(weekday).to_string(),
            departure_time: template.departure_time,
            real_departure_time: real_departure_for(template.departure_time),
            is_required: template.is_required,
            status: TrainStatus::Scheduled,
            is_archived: false,
            conductor_id: None,
            created_at: now,
            updated_at: now,
        });
        created.push((train.id, date, train.day_of_week.clone(), template.departure_time));
    }

    for (id, date, day, departure) in &created {
        tables.record_train(TrainHistoryEntry::system(
            HistoryAction::InstanceGenerated,
            Some(*id),
            format!("{date} ({day}) departs {departure}"),
        ));
    }

    if !created.is_empty() {
        info!(count = created.len(), "Generated train instances");
    }
    created.len()
}

/// Moves pending trains along `Scheduled -> Boarding -> Departed` according
/// to their departure window.
#[instrument(skip(tables), fields(now = %now))]
pub fn update_statuses(tables: &mut Tables, now: DateTime<Utc>) -> usize {
    let mut changes = Vec::new();

    for train in tables
        .trains
        .values_mut()
        .filter(|t| !t.is_archived && t.status.is_pending())
    {
        let (departure, real_departure) = train.departure_window();
        if let Some(next) = next_status(train.status, departure, real_departure, now) {
            changes.push((train.id, train.status, next));
            train.status = next;
            train.updated_at = now;
        }
    }

    for (id, from, to) in &changes {
        debug!(train = %id, %from, %to, "Train status changed");
        tables.record_train(TrainHistoryEntry::system(
            HistoryAction::StatusChanged,
            Some(*id),
            format!("{from} -> {to}"),
        ));
    }
    changes.len()
}

/// Archives every train dated before the end of yesterday, forcing its
/// status to `Completed`. Trains dated today or later are never touched.
#[instrument(skip(tables), fields(today = %now.date_naive()))]
pub fn archive_old_trains(tables: &mut Tables, now: DateTime<Utc>) -> usize {
    let cutoff = yesterday_end_of_day(now);
    let mut archived = Vec::new();

    for train in tables
        .trains
        .values_mut()
        .filter(|t| !t.is_archived && start_of(t.date) < cutoff)
    {
        archived.push((train.id, train.date, train.status));
        train.is_archived = true;
        train.status = TrainStatus::Completed;
        train.updated_at = now;
    }

    for (id, date, previous) in &archived {
        tables.record_train(TrainHistoryEntry::system(
            HistoryAction::Archived,
            Some(*id),
            format!("{date} archived (was {previous})"),
        ));
    }

    if !archived.is_empty() {
        info!(count = archived.len(), "Archived past trains");
    }
    archived.len()
}

/// Deletes passenger rows of trains whose real departure is more than 24h
/// in the past.
///
/// Eligible trains are `Departed` ones and archived `Completed` ones, since
/// archival runs first in the daily bundle and overwrites `Departed`.
#[instrument(skip(tables), fields(now = %now))]
pub fn cleanup_expired_passengers(tables: &mut Tables, now: DateTime<Utc>) -> usize {
    let threshold = now - PASSENGER_RETENTION;
    let expired: HashSet<TrainInstanceId> = tables
        .trains
        .values()
        .filter(|t| {
            let gone = t.status == TrainStatus::Departed
                || (t.is_archived && t.status == TrainStatus::Completed);
            gone && t.departure_window().1 < threshold
        })
        .map(|t| t.id)
        .collect();

    if expired.is_empty() {
        return 0;
    }

    let before = tables.passengers.len();
    tables
        .passengers
        .retain(|p| !expired.contains(&p.train_instance_id));
    let removed = before - tables.passengers.len();

    if removed > 0 {
        info!(removed, trains = expired.len(), "Pruned expired passengers");
        tables.record_train(TrainHistoryEntry::system(
            HistoryAction::PassengersPruned,
            None,
            format!("removed {removed} passengers from {} past trains", expired.len()),
        ));
    }
    removed
}

/// Runs the daily bundle in order: archive, generate, update, cleanup.
pub fn run_daily_maintenance(
    tables: &mut Tables,
    days_ahead: u32,
    now: DateTime<Utc>,
) -> MaintenanceReport {
    MaintenanceReport {
        archived: archive_old_trains(tables, now),
        generated: generate_instances(tables, days_ahead, now),
        status_changes: update_statuses(tables, now),
        passengers_removed: cleanup_expired_passengers(tables, now),
    }
}

fn start_of(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last millisecond of the day before `now`'s day.
fn yesterday_end_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    start_of(now.date_naive()) - Duration::milliseconds(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{arb_instant, insert_member, insert_train, utc};
    use crate::types::TrainPassenger;
    use proptest::prelude::*;

    fn non_archived_per_day(tables: &Tables) -> Vec<(NaiveDate, usize)> {
        let mut counts = std::collections::BTreeMap::new();
        for t in tables.trains.values().filter(|t| !t.is_archived) {
            *counts.entry(t.date).or_insert(0) += 1;
        }
        counts.into_iter().collect()
    }

    // ─── generate_instances ───

    #[test]
    fn generates_lookahead_plus_today() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 9, 3, 0); // Monday

        let created = generate_instances(&mut tables, 14, now);

        assert_eq!(created, 15);
        let first = tables.trains.values().next().unwrap();
        assert_eq!(first.date, now.date_naive());
        assert_eq!(first.day_of_week, "Lundi");
        assert_eq!(first.departure_time.to_string(), "20:00");
        assert_eq!(first.real_departure_time.to_string(), "00:00");
        assert!(first.is_required);
        assert_eq!(first.status, TrainStatus::Scheduled);

        let saturday = tables
            .trains
            .find(|t| t.date == NaiveDate::from_ymd_opt(2026, 3, 14).unwrap())
            .unwrap();
        assert_eq!(saturday.day_of_week, "Samedi");
        assert_eq!(saturday.departure_time.to_string(), "14:00");
        assert_eq!(saturday.real_departure_time.to_string(), "18:00");
        assert!(!saturday.is_required);
    }

    #[test]
    fn generation_is_idempotent() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 9, 3, 0);

        generate_instances(&mut tables, 14, now);
        let again = generate_instances(&mut tables, 14, now);
        let later = generate_instances(&mut tables, 14, now + Duration::hours(30));

        assert_eq!(again, 0);
        assert_eq!(later, 1);
        assert!(non_archived_per_day(&tables).iter().all(|(_, n)| *n == 1));
    }

    #[test]
    fn generation_skips_days_with_an_existing_train() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 9, 3, 0);
        insert_train(&mut tables, now.date_naive(), "21:30", TrainStatus::Scheduled);

        let created = generate_instances(&mut tables, 0, now);

        assert_eq!(created, 0);
        assert_eq!(tables.trains.len(), 1);
        assert_eq!(
            tables.trains.values().next().unwrap().departure_time.to_string(),
            "21:30"
        );
    }

    // ─── update_statuses ───

    #[test]
    fn evening_train_boards_then_departs_after_midnight() {
        let mut tables = Tables::default();
        let today = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let id = insert_train(&mut tables, today, "20:00", TrainStatus::Scheduled);

        update_statuses(&mut tables, utc(2026, 3, 9, 19, 59));
        assert_eq!(tables.trains.get(id).unwrap().status, TrainStatus::Scheduled);

        update_statuses(&mut tables, utc(2026, 3, 9, 20, 30));
        assert_eq!(tables.trains.get(id).unwrap().status, TrainStatus::Boarding);

        update_statuses(&mut tables, utc(2026, 3, 9, 23, 59));
        assert_eq!(tables.trains.get(id).unwrap().status, TrainStatus::Boarding);

        update_statuses(&mut tables, utc(2026, 3, 10, 0, 30));
        assert_eq!(tables.trains.get(id).unwrap().status, TrainStatus::Departed);
    }

    #[test]
    fn missed_window_goes_straight_to_departed() {
        let mut tables = Tables::default();
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let id = insert_train(&mut tables, day, "14:00", TrainStatus::Scheduled);

        let changed = update_statuses(&mut tables, utc(2026, 3, 14, 19, 0));

        assert_eq!(changed, 1);
        assert_eq!(tables.trains.get(id).unwrap().status, TrainStatus::Departed);
    }

    #[test]
    fn cancelled_and_archived_trains_are_left_alone() {
        let mut tables = Tables::default();
        let day = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let cancelled = insert_train(&mut tables, day, "20:00", TrainStatus::Cancelled);
        let archived = insert_train(&mut tables, day, "20:00", TrainStatus::Scheduled);
        tables.trains.get_mut(archived).unwrap().is_archived = true;

        let changed = update_statuses(&mut tables, utc(2026, 3, 10, 1, 0));

        assert_eq!(changed, 0);
        assert_eq!(tables.trains.get(cancelled).unwrap().status, TrainStatus::Cancelled);
        assert_eq!(tables.trains.get(archived).unwrap().status, TrainStatus::Scheduled);
    }

    #[test]
    fn status_changes_are_recorded() {
        let mut tables = Tables::default();
        let day = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        insert_train(&mut tables, day, "20:00", TrainStatus::Scheduled);

        update_statuses(&mut tables, utc(2026, 3, 9, 20, 30));

        let pending = tables.pending_audit();
        assert_eq!(pending.len(), 1);
        let entry = pending[0].train_history().unwrap();
        assert_eq!(entry.action, HistoryAction::StatusChanged);
        assert_eq!(entry.actor, "system");
        assert_eq!(entry.details, "SCHEDULED -> BOARDING");
    }

    #[test]
    fn generation_caps_an_oversized_lookahead() {
        let mut tables = Tables::default();
        let created = generate_instances(&mut tables, u32::MAX, utc(2026, 3, 9, 1, 0));
        assert_eq!(created, MAX_LOOKAHEAD_DAYS as usize + 1);
    }

    // ─── archive_old_trains ───

    #[test]
    fn archives_yesterday_but_not_today() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 10, 1, 0);
        let yesterday = insert_train(
            &mut tables,
            NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            "20:00",
            TrainStatus::Departed,
        );
        let today = insert_train(&mut tables, now.date_naive(), "20:00", TrainStatus::Scheduled);

        let archived = archive_old_trains(&mut tables, now);

        assert_eq!(archived, 1);
        let y = tables.trains.get(yesterday).unwrap();
        assert!(y.is_archived);
        assert_eq!(y.status, TrainStatus::Completed);
        let t = tables.trains.get(today).unwrap();
        assert!(!t.is_archived);
        assert_eq!(t.status, TrainStatus::Scheduled);
    }

    // ─── cleanup_expired_passengers ───

    #[test]
    fn prunes_only_departed_trains_older_than_a_day() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 12, 3, 0);
        let member = insert_member(&mut tables, "Kestrel");

        let old_departed = insert_train(
            &mut tables,
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            "20:00",
            TrainStatus::Departed,
        );
        let recent_departed = insert_train(
            &mut tables,
            NaiveDate::from_ymd_opt(2026, 3, 11).unwrap(),
            "20:00",
            TrainStatus::Departed,
        );
        let old_cancelled = insert_train(
            &mut tables,
            NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            "20:00",
            TrainStatus::Cancelled,
        );
        for train in [old_departed, recent_departed, old_cancelled] {
            tables.passengers.push(TrainPassenger {
                train_instance_id: train,
                passenger_id: member,
                joined_at: now,
            });
        }

        let removed = cleanup_expired_passengers(&mut tables, now);

        assert_eq!(removed, 1);
        let remaining: Vec<_> = tables.passengers.iter().map(|p| p.train_instance_id).collect();
        assert_eq!(remaining, vec![recent_departed, old_cancelled]);
    }

    #[test]
    fn prunes_archived_completed_trains() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 12, 3, 0);
        let member = insert_member(&mut tables, "Kestrel");
        let archived = insert_train(
            &mut tables,
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            "20:00",
            TrainStatus::Completed,
        );
        tables.trains.get_mut(archived).unwrap().is_archived = true;
        tables.passengers.push(TrainPassenger {
            train_instance_id: archived,
            passenger_id: member,
            joined_at: now,
        });

        assert_eq!(cleanup_expired_passengers(&mut tables, now), 1);
        assert!(tables.passengers.is_empty());
    }

    #[test]
    fn keeps_passengers_until_a_day_after_real_departure() {
        let mut tables = Tables::default();
        let member = insert_member(&mut tables, "Kestrel");
        // Real departure is 2026-03-11 00:00.
        let train = insert_train(
            &mut tables,
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            "20:00",
            TrainStatus::Departed,
        );
        tables.passengers.push(TrainPassenger {
            train_instance_id: train,
            passenger_id: member,
            joined_at: utc(2026, 3, 10, 12, 0),
        });

        assert_eq!(cleanup_expired_passengers(&mut tables, utc(2026, 3, 12, 0, 0)), 0);
        assert_eq!(cleanup_expired_passengers(&mut tables, utc(2026, 3, 12, 0, 1)), 1);
    }

    // ─── run_daily_maintenance ───

    #[test]
    fn maintenance_on_empty_store_fills_the_lookahead() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 9, 1, 0);

        let report = run_daily_maintenance(&mut tables, 14, now);

        assert_eq!(
            report,
            MaintenanceReport {
                archived: 0,
                generated: 15,
                status_changes: 0,
                passengers_removed: 0,
            }
        );
    }

    #[test]
    fn maintenance_rolls_the_window_forward() {
        let mut tables = Tables::default();
        run_daily_maintenance(&mut tables, 14, utc(2026, 3, 9, 1, 0));

        let report = run_daily_maintenance(&mut tables, 14, utc(2026, 3, 10, 1, 0));

        assert_eq!(report.archived, 1);
        assert_eq!(report.generated, 1);
        // Monday's train had already departed at midnight; only archival touched it.
        assert_eq!(report.status_changes, 0);
        assert_eq!(tables.trains.values().filter(|t| !t.is_archived).count(), 15);
    }

    #[test]
    fn daily_maintenance_prunes_passengers_of_past_trains() {
        let mut tables = Tables::default();
        let member = insert_member(&mut tables, "Kestrel");
        run_daily_maintenance(&mut tables, 14, utc(2026, 3, 9, 1, 0));
        let monday = tables
            .trains
            .values()
            .find(|t| t.date == NaiveDate::from_ymd_opt(2026, 3, 9).unwrap())
            .map(|t| t.id)
            .unwrap();
        tables.passengers.push(TrainPassenger {
            train_instance_id: monday,
            passenger_id: member,
            joined_at: utc(2026, 3, 9, 12, 0),
        });

        let removed: Vec<usize> = (10..=16)
            .map(|day| {
                run_daily_maintenance(&mut tables, 14, utc(2026, 3, day, 1, 0)).passengers_removed
            })
            .collect();

        assert_eq!(removed, vec![0, 1, 0, 0, 0, 0, 0]);
        assert!(tables.passengers.is_empty());
        let train = tables.trains.get(monday).unwrap();
        assert!(train.is_archived);
        assert_eq!(train.status, TrainStatus::Completed);
    }

    proptest! {
        #[test]
        fn at_most_one_live_train_per_day(
            start in arb_instant(),
            steps in prop::collection::vec(0i64..72, 1..8),
            days_ahead in 0u32..20,
        ) {
            let mut tables = Tables::default();
            let mut now = start;
            for hours in steps {
                run_daily_maintenance(&mut tables, days_ahead, now);
                now += Duration::hours(hours);
            }
            prop_assert!(non_archived_per_day(&tables).iter().all(|(_, n)| *n == 1));
        }

        #[test]
        fn archive_never_touches_today_or_later(
            now in arb_instant(),
            offsets in prop::collection::vec(-5i64..5, 1..10),
        ) {
            let mut tables = Tables::default();
            for offset in &offsets {
                insert_train(
                    &mut tables,
                    now.date_naive() + Duration::days(*offset),
                    "20:00",
                    TrainStatus::Scheduled,
                );
            }

            archive_old_trains(&mut tables, now);

            for t in tables.trains.values() {
                prop_assert_eq!(t.is_archived, t.date < now.date_naive());
            }
        }
    }
}
