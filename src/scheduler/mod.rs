//! Train scheduling.
//!
//! Generates one train per day from a fixed weekly template, moves trains
//! through their daily lifecycle, archives past days, and prunes stale
//! passenger registrations. [`jobs`] holds the pure table operations;
//! [`runner::Scheduler`] drives them on timers.

pub mod config;
pub mod jobs;
pub mod runner;
pub mod template;
pub mod transitions;

pub use config::SchedulerConfig;
pub use jobs::{
    MaintenanceReport, archive_old_trains, cleanup_expired_passengers, generate_instances,
    run_daily_maintenance, update_statuses,
};
pub use runner::Scheduler;
