//! Fixed weekly train template.

use chrono::Weekday;

use crate::types::ClockTime;

/// Registration-open time for Monday to Friday trains.
const WEEKDAY_DEPARTURE: ClockTime = ClockTime::hm(20, 0);

/// Registration-open time for weekend trains.
const WEEKEND_DEPARTURE: ClockTime = ClockTime::hm(14, 0);

/// Defaults applied to a newly generated train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTemplate {
    pub departure_time: ClockTime,
    pub is_required: bool,
}

/// Template for a weekday: 20:00 and required on weekdays, 14:00 and
/// optional on weekends.
pub fn template_for(weekday: Weekday) -> DayTemplate {
    match weekday {
        Weekday::Sat | Weekday::Sun => DayTemplate {
            departure_time: WEEKEND_DEPARTURE,
            is_required: false,
        },
        _ => DayTemplate {
            departure_time: WEEKDAY_DEPARTURE,
            is_required: true,
        },
    }
}

/// Localized weekday name stored on each train.
pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Lundi",
        Weekday::Tue => "Mardi",
        Weekday::Wed => "Mercredi",
        Weekday::Thu => "Jeudi",
        Weekday::Fri => "Vendredi",
        Weekday::Sat => "Samedi",
        Weekday::Sun => "Dimanche",
    }
}
