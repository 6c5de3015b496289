//! Timing configuration for the train scheduler.
//!
//! # Schedule
//!
//! - **Status updates**: every 60 minutes by default
//!   (`ALLIANCE_HUB_STATUS_INTERVAL_MINS`)
//! - **Daily maintenance**: once a day at 01:00 UTC by default
//!   (`ALLIANCE_HUB_MAINTENANCE_HOUR`), plus once at startup
//! - **Lookahead**: trains are generated for today and the next 14 days
//!   (`ALLIANCE_HUB_LOOKAHEAD_DAYS`)

use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};

use tracing::warn;

use crate::config::parse_var;

/// Default interval between status updates (60 minutes).
const DEFAULT_STATUS_INTERVAL_MINS: u64 = 60;

/// Default UTC hour at which daily maintenance runs.
const DEFAULT_MAINTENANCE_HOUR: u32 = 1;

/// Default number of days ahead to generate trains for.
const DEFAULT_LOOKAHEAD_DAYS: u32 = 14;

/// Largest accepted lookahead.
pub const MAX_LOOKAHEAD_DAYS: u32 = 366;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Interval between status update passes.
    pub status_interval: Duration,

    /// UTC hour (0-23) for daily maintenance.
    pub maintenance_hour: u32,

    /// Days after today to generate trains for.
    pub lookahead_days: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        SchedulerConfig {
            status_interval: Duration::from_secs(DEFAULT_STATUS_INTERVAL_MINS * 60),
            maintenance_hour: DEFAULT_MAINTENANCE_HOUR,
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
        }
    }

    /// Reads overrides from any variable source. Missing or malformed
    /// values fall back to defaults; a zero interval, an hour past 23 or a
    /// lookahead beyond [`MAX_LOOKAHEAD_DAYS`] is ignored.
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::new();

        let status_mins = parse_var::<u64>(lookup, "ALLIANCE_HUB_STATUS_INTERVAL_MINS")
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_STATUS_INTERVAL_MINS);
        let maintenance_hour = parse_var::<u32>(lookup, "ALLIANCE_HUB_MAINTENANCE_HOUR")
            .filter(|h| *h < 24)
            .unwrap_or(defaults.maintenance_hour);
        let lookahead_days = parse_var::<u32>(lookup, "ALLIANCE_HUB_LOOKAHEAD_DAYS")
            .filter(|d| {
                let ok = *d <= MAX_LOOKAHEAD_DAYS;
                if !ok {
                    warn!(days = *d, max = MAX_LOOKAHEAD_DAYS, "Ignoring oversized lookahead");
                }
                ok
            })
            .unwrap_or(defaults.lookahead_days);

        SchedulerConfig {
            status_interval: Duration::from_secs(status_mins * 60),
            maintenance_hour,
            lookahead_days,
        }
    }

    /// Time from `now` until the next daily maintenance slot.
    ///
    /// If the slot for today has already passed (or is exactly now), the
    /// next one is tomorrow.
    pub fn until_next_maintenance(&self, now: DateTime<Utc>) -> Duration {
        let slot = NaiveTime::from_hms_opt(self.maintenance_hour, 0, 0).unwrap_or(NaiveTime::MIN);
        let mut next = now.date_naive().and_time(slot).and_utc();
        if next <= now {
            next += ChronoDuration::days(1);
        }
        (next - now).to_std().unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::utc;

    #[test]
    fn default_config_has_expected_values() {
        let config = SchedulerConfig::new();

        assert_eq!(config.status_interval, Duration::from_secs(3600));
        assert_eq!(config.maintenance_hour, 1);
        assert_eq!(config.lookahead_days, 14);
    }

    #[test]
    fn oversized_lookahead_falls_back() {
        let lookup = |value: &'static str| {
            move |name: &str| (name == "ALLIANCE_HUB_LOOKAHEAD_DAYS").then(|| value.to_string())
        };

        let config = SchedulerConfig::from_lookup(&lookup("4294967295"));
        assert_eq!(config.lookahead_days, 14);

        let config = SchedulerConfig::from_lookup(&lookup("367"));
        assert_eq!(config.lookahead_days, 14);

        let config = SchedulerConfig::from_lookup(&lookup("366"));
        assert_eq!(config.lookahead_days, MAX_LOOKAHEAD_DAYS);
    }

    #[test]
    fn next_maintenance_later_today() {
        let config = SchedulerConfig::new();
        let wait = config.until_next_maintenance(utc(2026, 3, 9, 0, 30));
        assert_eq!(wait, Duration::from_secs(30 * 60));
    }

    #[test]
    fn next_maintenance_tomorrow_once_passed() {
        let config = SchedulerConfig::new();
        let wait = config.until_next_maintenance(utc(2026, 3, 9, 1, 0));
        assert_eq!(wait, Duration::from_secs(24 * 3600));

        let wait = config.until_next_maintenance(utc(2026, 3, 9, 13, 0));
        assert_eq!(wait, Duration::from_secs(12 * 3600));
    }
}
