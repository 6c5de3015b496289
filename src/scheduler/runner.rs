//! Background task driving the scheduler jobs.
//!
//! Every job runs inside its own store transaction; a failed step is logged
//! and the next one still runs.

use chrono::{DateTime, Utc};
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::config::SchedulerConfig;
use super::jobs::{self, MaintenanceReport};
use crate::store::{SharedStore, Tables};

pub struct Scheduler {
    store: SharedStore,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(store: SharedStore, config: SchedulerConfig) -> Self {
        Scheduler { store, config }
    }

    /// Runs until `shutdown` is cancelled.
    ///
    /// Daily maintenance runs once immediately, then at the configured hour.
    /// Status updates run on their own fixed interval.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            status_interval_secs = self.config.status_interval.as_secs(),
            maintenance_hour = self.config.maintenance_hour,
            lookahead_days = self.config.lookahead_days,
            "Scheduler started"
        );

        self.maintenance(Utc::now()).await;

        let mut status_tick = interval(self.config.status_interval);
        status_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; maintenance just covered it.
        status_tick.tick().await;

        loop {
            let until_maintenance = self.config.until_next_maintenance(Utc::now());

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping scheduler");
                    break;
                }

                _ = status_tick.tick() => {
                    let changed = self
                        .counted("update_statuses", Utc::now(), jobs::update_statuses)
                        .await;
                    if changed > 0 {
                        info!(changed, "Train statuses updated");
                    }
                }

                _ = sleep(until_maintenance) => {
                    self.maintenance(Utc::now()).await;
                }
            }
        }
    }

    /// Runs the daily bundle with one transaction per step. A failed step is
    /// logged and counted as zero; the remaining steps still run.
    pub async fn maintenance(&self, now: DateTime<Utc>) -> MaintenanceReport {
        let lookahead = self.config.lookahead_days;
        let report = MaintenanceReport {
            archived: self
                .counted("archive_old_trains", now, jobs::archive_old_trains)
                .await,
            generated: self
                .counted("generate_instances", now, |t, now| {
                    jobs::generate_instances(t, lookahead, now)
                })
                .await,
            status_changes: self
                .counted("update_statuses", now, jobs::update_statuses)
                .await,
            passengers_removed: self
                .counted(
                    "cleanup_expired_passengers",
                    now,
                    jobs::cleanup_expired_passengers,
                )
                .await,
        };
        info!(?report, "Daily maintenance finished");
        report
    }

    async fn counted(
        &self,
        name: &'static str,
        now: DateTime<Utc>,
        job: impl FnOnce(&mut Tables, DateTime<Utc>) -> usize,
    ) -> usize {
        let mut store = self.store.write().await;
        match store.mutate(|t| job(t, now)) {
            Ok(n) => n,
            Err(e) => {
                warn!(job = name, error = %e, "Scheduler job failed");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use crate::test_utils::utc;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::sync::RwLock;

    #[tokio::test]
    async fn maintenance_commits_each_step() {
        let dir = tempdir().unwrap();
        let store = Arc::new(RwLock::new(Store::open(dir.path()).unwrap()));
        let scheduler = Scheduler::new(store.clone(), SchedulerConfig::new());

        let report = scheduler.maintenance(utc(2026, 3, 9, 1, 0)).await;
        assert_eq!(report.generated, 15);

        drop(scheduler);
        let reopened = Store::open(dir.path()).unwrap();
        assert_eq!(reopened.tables().trains.len(), 15);
        assert_eq!(reopened.audit_records().unwrap().len(), 15);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let dir = tempdir().unwrap();
        let store = Arc::new(RwLock::new(Store::open(dir.path()).unwrap()));
        let scheduler = Scheduler::new(store.clone(), SchedulerConfig::new());
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(scheduler.run(shutdown.clone()));
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
        assert!(!store.read().await.tables().trains.is_empty());
    }
}
