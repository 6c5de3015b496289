//! Train instance, passenger and history types.
//!
//! A train is the alliance's daily cooperative run. Each calendar day gets
//! one [`TrainInstance`]; members register as [`TrainPassenger`]s while it is
//! open, and every mutation leaves a [`TrainHistoryEntry`] in the audit log.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::clock::ClockTime;
use super::ids::{MemberId, TrainInstanceId};

/// Hours between registration opening and the real departure.
pub const BOARDING_WINDOW_HOURS: u16 = 4;

/// Lifecycle status of a train instance.
///
/// Automatic transitions only ever move forward:
/// `Scheduled -> Boarding -> Departed -> Completed`. `Cancelled` is reached
/// only through an explicit admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainStatus {
    /// Waiting for registration to open.
    Scheduled,
    /// Registration is open; passengers may board.
    Boarding,
    /// The real departure time has passed.
    Departed,
    /// Cancelled by an admin.
    Cancelled,
    /// Archived after its day ended.
    Completed,
}

impl TrainStatus {
    /// Statuses the periodic status pass still has work to do for.
    pub fn is_pending(&self) -> bool {
        matches!(self, TrainStatus::Scheduled | TrainStatus::Boarding)
    }

    /// Returns true if passengers may still register.
    pub fn accepts_passengers(&self) -> bool {
        self.is_pending()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainStatus::Scheduled => "SCHEDULED",
            TrainStatus::Boarding => "BOARDING",
            TrainStatus::Departed => "DEPARTED",
            TrainStatus::Cancelled => "CANCELLED",
            TrainStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for TrainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day's train.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainInstance {
    pub id: TrainInstanceId,

    /// The calendar day (UTC) this train runs on.
    pub date: NaiveDate,

    /// Localized weekday name, e.g. "Lundi".
    pub day_of_week: String,

    /// When registration opens.
    pub departure_time: ClockTime,

    /// `departure_time + 4h`, wrapping past midnight.
    pub real_departure_time: ClockTime,

    /// Whether attendance is required (weekday trains) or optional.
    pub is_required: bool,

    pub status: TrainStatus,

    pub is_archived: bool,

    pub conductor_id: Option<MemberId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl TrainInstance {
    /// Returns `(departure, real_departure)` as instants.
    ///
    /// When the real departure clock time is earlier than the departure clock
    /// time it wrapped past midnight, so it falls on the following day.
    pub fn departure_window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let departure = self
            .date
            .and_time(self.departure_time.to_naive_time())
            .and_utc();
        let mut real = self
            .date
            .and_time(self.real_departure_time.to_naive_time())
            .and_utc();
        if real < departure {
            real += Duration::days(1);
        }
        (departure, real)
    }

    /// Replaces the departure time, recomputing the real departure and
    /// resetting the status to `Scheduled`.
    pub fn reschedule(&mut self, departure_time: ClockTime, now: DateTime<Utc>) {
        self.departure_time = departure_time;
        self.real_departure_time = real_departure_for(departure_time);
        self.status = TrainStatus::Scheduled;
        self.updated_at = now;
    }
}

/// Computes the real departure clock time for a registration-open time.
pub fn real_departure_for(departure_time: ClockTime) -> ClockTime {
    departure_time.add_hours(BOARDING_WINDOW_HOURS).0
}

/// A member registered on a train.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainPassenger {
    pub train_instance_id: TrainInstanceId,
    pub passenger_id: MemberId,
    pub joined_at: DateTime<Utc>,
}

/// What happened to a train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    InstanceGenerated,
    StatusChanged,
    Archived,
    ConductorAssigned,
    ConductorCleared,
    DepartureChanged,
    Cancelled,
    PassengerJoined,
    PassengerLeft,
    PassengersPruned,
    Imported,
}

/// Actor name used for changes made by the background scheduler.
pub const SYSTEM_ACTOR: &str = "system";

/// One audit row describing a train mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainHistoryEntry {
    pub action: HistoryAction,

    /// Who made the change (`"system"` for the scheduler).
    pub actor: String,

    /// The train the change applies to, if it concerns a single one.
    pub target: Option<TrainInstanceId>,

    /// Free-text description.
    pub details: String,
}

impl TrainHistoryEntry {
    pub fn new(
        action: HistoryAction,
        actor: impl Into<String>,
        target: Option<TrainInstanceId>,
        details: impl Into<String>,
    ) -> Self {
        TrainHistoryEntry {
            action,
            actor: actor.into(),
            target,
            details: details.into(),
        }
    }

    /// Shorthand for an entry written by the scheduler.
    pub fn system(
        action: HistoryAction,
        target: Option<TrainInstanceId>,
        details: impl Into<String>,
    ) -> Self {
        Self::new(action, SYSTEM_ACTOR, target, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instance(date: NaiveDate, departure: &str) -> TrainInstance {
        let departure_time: ClockTime = departure.parse().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        TrainInstance {
            id: TrainInstanceId(1),
            date,
            day_of_week: "Lundi".to_string(),
            departure_time,
            real_departure_time: real_departure_for(departure_time),
            is_required: true,
            status: TrainStatus::Scheduled,
            is_archived: false,
            conductor_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn window_without_wrap_stays_on_same_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let (dep, real) = instance(date, "14:00").departure_window();
        assert_eq!(dep, Utc.with_ymd_and_hms(2026, 3, 7, 14, 0, 0).unwrap());
        assert_eq!(real, Utc.with_ymd_and_hms(2026, 3, 7, 18, 0, 0).unwrap());
    }

    #[test]
    fn window_with_wrap_moves_real_departure_to_next_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let train = instance(date, "20:00");
        assert_eq!(train.real_departure_time.to_string(), "00:00");

        let (dep, real) = train.departure_window();
        assert_eq!(dep, Utc.with_ymd_and_hms(2026, 3, 9, 20, 0, 0).unwrap());
        assert_eq!(real, Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn reschedule_resets_status_and_recomputes_real_departure() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let mut train = instance(date, "20:00");
        train.status = TrainStatus::Boarding;

        let now = Utc.with_ymd_and_hms(2026, 3, 9, 21, 0, 0).unwrap();
        train.reschedule("22:30".parse().unwrap(), now);

        assert_eq!(train.status, TrainStatus::Scheduled);
        assert_eq!(train.real_departure_time.to_string(), "02:30");
        assert_eq!(train.updated_at, now);
    }

    #[test]
    fn status_serializes_in_upper_case() {
        assert_eq!(
            serde_json::to_string(&TrainStatus::Boarding).unwrap(),
            "\"BOARDING\""
        );
        assert_eq!(TrainStatus::Departed.to_string(), "DEPARTED");
    }

    #[test]
    fn only_scheduled_and_boarding_are_pending() {
        assert!(TrainStatus::Scheduled.is_pending());
        assert!(TrainStatus::Boarding.is_pending());
        assert!(!TrainStatus::Departed.is_pending());
        assert!(!TrainStatus::Cancelled.is_pending());
        assert!(!TrainStatus::Completed.is_pending());
    }
}
