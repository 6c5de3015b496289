//! VS (versus-war) weeks, days and participant scores.
//!
//! A VS week runs six scored days against one opposing alliance. Week
//! totals are never stored; they are summed from [`VsDay`] rows on read.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{MemberId, VsWeekId};

/// Number of scored days in a VS week.
pub const VS_DAYS: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    #[default]
    Pending,
    Victory,
    Defeat,
    Draw,
}

impl MatchResult {
    /// Result implied by two scores.
    pub fn from_scores(ours: u64, theirs: u64) -> Self {
        match ours.cmp(&theirs) {
            std::cmp::Ordering::Greater => MatchResult::Victory,
            std::cmp::Ordering::Less => MatchResult::Defeat,
            std::cmp::Ordering::Equal => MatchResult::Draw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsWeek {
    pub id: VsWeekId,
    pub year: i32,

    /// ISO week number, unique per year.
    pub week_number: u32,

    pub opponent: Option<String>,
    pub start_date: NaiveDate,
    pub result: MatchResult,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsDay {
    pub week_id: VsWeekId,

    /// 1-based day within the week.
    pub day: u8,

    pub our_score: u64,
    pub their_score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsParticipant {
    pub week_id: VsWeekId,
    pub member_id: MemberId,

    /// Points per day, index 0 is day 1.
    pub points: [u64; VS_DAYS],
}

impl VsParticipant {
    pub fn new(week_id: VsWeekId, member_id: MemberId) -> Self {
        VsParticipant {
            week_id,
            member_id,
            points: [0; VS_DAYS],
        }
    }

    /// Sum of the daily points, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.points.iter().fold(0u64, |acc, p| acc.saturating_add(*p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_from_scores() {
        assert_eq!(MatchResult::from_scores(10, 3), MatchResult::Victory);
        assert_eq!(MatchResult::from_scores(3, 10), MatchResult::Defeat);
        assert_eq!(MatchResult::from_scores(5, 5), MatchResult::Draw);
    }

    #[test]
    fn participant_total_sums_days() {
        let mut p = VsParticipant::new(VsWeekId(1), MemberId(2));
        p.points[0] = 100;
        p.points[5] = 23;
        assert_eq!(p.total(), 123);
    }

    #[test]
    fn participant_total_saturates() {
        let mut p = VsParticipant::new(VsWeekId(1), MemberId(2));
        p.points = [u64::MAX, 1, 0, 0, 0, u64::MAX];
        assert_eq!(p.total(), u64::MAX);
    }
}
