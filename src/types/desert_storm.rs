//! Desert Storm battles and their rosters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{DesertStormId, MemberId};
use super::vs::MatchResult;

/// Starting slots per team.
pub const MAX_STARTERS_PER_TEAM: usize = 20;

/// Substitute slots per team.
pub const MAX_SUBSTITUTES_PER_TEAM: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub member_id: MemberId,
    pub team: Team,
    #[serde(default)]
    pub substitute: bool,
    #[serde(default)]
    pub points: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesertStorm {
    pub id: DesertStormId,
    pub date: NaiveDate,
    pub opponent: Option<String>,
    pub result: MatchResult,
    pub our_score: u64,
    pub their_score: u64,
    pub roster: Vec<RosterEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DesertStorm {
    /// Counts `(starters, substitutes)` for a team.
    pub fn team_counts(roster: &[RosterEntry], team: Team) -> (usize, usize) {
        roster
            .iter()
            .filter(|e| e.team == team)
            .fold((0, 0), |(starters, subs), e| {
                if e.substitute {
                    (starters, subs + 1)
                } else {
                    (starters + 1, subs)
                }
            })
    }
}
