//! Alliance calendar events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::EventId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllianceEvent {
    pub id: EventId,
    pub name: String,

    /// Reference category `eventType`.
    pub event_type: Option<String>,

    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,

    /// Never earlier than `starts_at`.
    pub ends_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AllianceEvent {
    /// Returns true if the event starts within `[from, until)`.
    pub fn starts_between(&self, from: DateTime<Utc>, until: DateTime<Utc>) -> bool {
        self.starts_at >= from && self.starts_at < until
    }
}
