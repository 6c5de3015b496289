//! Desert Storm battles and team rosters.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{OpError, OpResult, clean};
use crate::store::Tables;
use crate::types::desert_storm::{MAX_STARTERS_PER_TEAM, MAX_SUBSTITUTES_PER_TEAM};
use crate::types::{DesertStorm, DesertStormId, MatchResult, RosterEntry, Team};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesertStormFields {
    pub date: Option<NaiveDate>,
    pub opponent: Option<String>,
    pub result: Option<MatchResult>,
    pub our_score: Option<u64>,
    pub their_score: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterUpdate {
    pub roster: Vec<RosterEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSize {
    pub team: Team,
    pub starters: usize,
    pub substitutes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesertStormView {
    #[serde(flatten)]
    pub battle: DesertStorm,
    pub teams: [TeamSize; 2],
}

impl DesertStormView {
    pub fn new(battle: DesertStorm) -> Self {
        let size = |team| {
            let (starters, substitutes) = DesertStorm::team_counts(&battle.roster, team);
            TeamSize {
                team,
                starters,
                substitutes,
            }
        };
        let teams = [size(Team::A), size(Team::B)];
        DesertStormView { battle, teams }
    }
}

/// Lists battles, most recent first.
pub fn list(tables: &Tables) -> Vec<DesertStormView> {
    let mut battles: Vec<DesertStorm> = tables.desert_storms.values().cloned().collect();
    battles.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    battles.into_iter().map(DesertStormView::new).collect()
}

pub fn latest(tables: &Tables) -> Option<DesertStormView> {
    tables
        .desert_storms
        .values()
        .max_by_key(|b| (b.date, b.id))
        .cloned()
        .map(DesertStormView::new)
}

pub fn get(tables: &Tables, id: DesertStormId) -> OpResult<&DesertStorm> {
    tables
        .desert_storms
        .get(id)
        .ok_or_else(|| OpError::not_found("Desert Storm", id))
}

pub fn create(
    tables: &mut Tables,
    fields: DesertStormFields,
    now: DateTime<Utc>,
) -> OpResult<DesertStorm> {
    let date = fields
        .date
        .ok_or_else(|| OpError::validation("date is required"))?;
    let battle = tables.desert_storms.insert_with(|id| DesertStorm {
        id,
        date,
        opponent: clean(fields.opponent),
        result: fields.result.unwrap_or_default(),
        our_score: fields.our_score.unwrap_or(0),
        their_score: fields.their_score.unwrap_or(0),
        roster: Vec::new(),
        created_at: now,
        updated_at: now,
    });
    Ok(battle.clone())
}

pub fn update(
    tables: &mut Tables,
    id: DesertStormId,
    fields: DesertStormFields,
    now: DateTime<Utc>,
) -> OpResult<DesertStorm> {
    let battle = tables
        .desert_storms
        .get_mut(id)
        .ok_or_else(|| OpError::not_found("Desert Storm", id))?;
    if let Some(date) = fields.date {
        battle.date = date;
    }
    if fields.opponent.is_some() {
        battle.opponent = clean(fields.opponent);
    }
    if let Some(ours) = fields.our_score {
        battle.our_score = ours;
    }
    if let Some(theirs) = fields.their_score {
        battle.their_score = theirs;
    }
    match fields.result {
        Some(result) => battle.result = result,
        // Entering both scores settles a pending battle.
        None if battle.result == MatchResult::Pending
            && fields.our_score.is_some()
            && fields.their_score.is_some() =>
        {
            battle.result = MatchResult::from_scores(battle.our_score, battle.their_score);
        }
        None => {}
    }
    battle.updated_at = now;
    Ok(battle.clone())
}

pub fn delete(tables: &mut Tables, id: DesertStormId) -> OpResult<DesertStorm> {
    tables
        .desert_storms
        .remove(id)
        .ok_or_else(|| OpError::not_found("Desert Storm", id))
}

/// Replaces the roster of a battle.
///
/// Every member must exist and appear once; each team holds at most
/// 20 starters and 10 substitutes.
pub fn set_roster(
    tables: &mut Tables,
    id: DesertStormId,
    roster: Vec<RosterEntry>,
    now: DateTime<Utc>,
) -> OpResult<DesertStorm> {
    get(tables, id)?;

    let mut seen = HashSet::new();
    for entry in &roster {
        if !tables.members.contains(entry.member_id) {
            return Err(OpError::validation(format!(
                "unknown member {}",
                entry.member_id
            )));
        }
        if !seen.insert(entry.member_id) {
            return Err(OpError::validation(format!(
                "member {} appears more than once",
                entry.member_id
            )));
        }
    }
    for team in [Team::A, Team::B] {
        let (starters, subs) = DesertStorm::team_counts(&roster, team);
        if starters > MAX_STARTERS_PER_TEAM {
            return Err(OpError::validation(format!(
                "team {team:?} has {starters} starters (max {MAX_STARTERS_PER_TEAM})"
            )));
        }
        if subs > MAX_SUBSTITUTES_PER_TEAM {
            return Err(OpError::validation(format!(
                "team {team:?} has {subs} substitutes (max {MAX_SUBSTITUTES_PER_TEAM})"
            )));
        }
    }

    let battle = tables
        .desert_storms
        .get_mut(id)
        .ok_or_else(|| OpError::not_found("Desert Storm", id))?;
    battle.roster = roster;
    battle.updated_at = now;
    Ok(battle.clone())
}
