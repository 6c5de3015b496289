//! Alliance Hub - management backend for a Last War alliance.
//!
//! Keeps the alliance's members, events, daily trains, VS weeks, Desert
//! Storm rosters, help articles and reference catalogs in a durable store,
//! serves them over a JSON HTTP API, and runs the scheduler that generates
//! and advances the daily trains.

pub mod config;
pub mod import;
pub mod ops;
pub mod permissions;
pub mod scheduler;
pub mod server;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
