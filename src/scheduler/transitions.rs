//! Time-driven status transitions for train instances.
//!
//! Pure functions: given a status, the train's departure window and the
//! current instant, compute the status the train should move to.

use chrono::{DateTime, Utc};

use crate::types::TrainStatus;

/// Returns the status a pending train should move to at `now`, or `None`
/// if it should stay where it is.
///
/// - `now >= real_departure`: `Departed`
/// - `departure <= now < real_departure` and `Scheduled`: `Boarding`
///
/// Statuses other than `Scheduled` and `Boarding` never move automatically.
pub fn next_status(
    current: TrainStatus,
    departure: DateTime<Utc>,
    real_departure: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<TrainStatus> {
    if !current.is_pending() {
        return None;
    }
    if now >= real_departure {
        return Some(TrainStatus::Departed);
    }
    if now >= departure && current == TrainStatus::Scheduled {
        return Some(TrainStatus::Boarding);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 9, h, m, 0).unwrap()
    }

    #[test]
    fn scheduled_before_departure_stays() {
        assert_eq!(
            next_status(TrainStatus::Scheduled, at(20, 0), at(23, 59), at(19, 59)),
            None
        );
    }

    #[test]
    fn scheduled_at_departure_boards() {
        assert_eq!(
            next_status(TrainStatus::Scheduled, at(20, 0), at(23, 59), at(20, 0)),
            Some(TrainStatus::Boarding)
        );
    }

    #[test]
    fn boarding_inside_window_stays() {
        assert_eq!(
            next_status(TrainStatus::Boarding, at(20, 0), at(23, 59), at(21, 0)),
            None
        );
    }

    #[test]
    fn scheduled_past_real_departure_skips_boarding() {
        assert_eq!(
            next_status(TrainStatus::Scheduled, at(14, 0), at(18, 0), at(18, 0)),
            Some(TrainStatus::Departed)
        );
    }

    #[test]
    fn terminal_statuses_never_move() {
        for status in [
            TrainStatus::Departed,
            TrainStatus::Cancelled,
            TrainStatus::Completed,
        ] {
            assert_eq!(next_status(status, at(0, 0), at(4, 0), at(23, 0)), None);
        }
    }

    proptest! {
        #[test]
        fn scheduled_transition_matches_window(
            dep_offset in 0i64..(48 * 60),
            now_offset in 0i64..(72 * 60),
        ) {
            let base = at(0, 0);
            let departure = base + Duration::minutes(dep_offset);
            let real = departure + Duration::hours(4);
            let now = base + Duration::minutes(now_offset);

            let next = next_status(TrainStatus::Scheduled, departure, real, now);
            let expected = if now >= real {
                Some(TrainStatus::Departed)
            } else if now >= departure {
                Some(TrainStatus::Boarding)
            } else {
                None
            };
            prop_assert_eq!(next, expected);
        }
    }
}
