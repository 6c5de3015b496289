//! Process configuration, read from `ALLIANCE_HUB_*` environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `ALLIANCE_HUB_ADDR` | `0.0.0.0:3000` |
//! | `ALLIANCE_HUB_DATA_DIR` | `./data` |
//! | `ALLIANCE_HUB_SCHEDULER` | `on` |
//!
//! plus the scheduler timings in [`SchedulerConfig`]. Malformed values are
//! logged and replaced by the default.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::scheduler::SchedulerConfig;

const DEFAULT_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 3000);
const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
    pub data_dir: PathBuf,
    /// Whether the background train scheduler runs in this process.
    pub scheduler_enabled: bool,
    pub scheduler: SchedulerConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(&|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let addr = parse_var(lookup, "ALLIANCE_HUB_ADDR")
            .unwrap_or_else(|| SocketAddr::from(DEFAULT_ADDR));
        let data_dir = lookup("ALLIANCE_HUB_DATA_DIR")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
            .into();
        let scheduler_enabled = match lookup("ALLIANCE_HUB_SCHEDULER") {
            None => true,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "on" | "true" | "1" | "yes" => true,
                "off" | "false" | "0" | "no" => false,
                _ => {
                    warn!(value, "Ignoring malformed ALLIANCE_HUB_SCHEDULER");
                    true
                }
            },
        };

        Config {
            addr,
            data_dir,
            scheduler_enabled,
            scheduler: SchedulerConfig::from_lookup(lookup),
        }
    }
}

/// Parses one variable, warning about and discarding unparseable values.
pub(crate) fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(name, value = %raw, "Ignoring malformed setting");
            None
        }
    }
}
