//! Alliance member records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::MemberId;

/// Whether a member currently plays in the alliance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    Active,
    Inactive,
}

impl MemberStatus {
    /// Parses the loose spellings found in spreadsheets.
    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" | "actif" | "1" | "yes" | "true" => Some(MemberStatus::Active),
            "inactive" | "inactif" | "0" | "no" | "false" => Some(MemberStatus::Inactive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,

    /// In-game name. Unique across the alliance, compared case-insensitively.
    pub pseudo: String,

    pub level: u32,

    /// Squad power.
    pub power: u64,

    /// Alliance rank key (reference category `role`), e.g. "R4".
    pub alliance_role: Option<String>,

    /// Reference category `specialty`.
    pub specialty: Option<String>,

    /// Reference category `tag`.
    pub tags: Vec<String>,

    pub status: MemberStatus,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Case-insensitive pseudo comparison.
    pub fn has_pseudo(&self, pseudo: &str) -> bool {
        self.pseudo.trim().eq_ignore_ascii_case(pseudo.trim())
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}
