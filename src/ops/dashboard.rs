//! Aggregated landing-page view.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use super::desert_storm::{self, DesertStormView};
use super::events;
use super::trains::{self, MemberRef};
use super::vs::{self, VsWeekSummary};
use crate::store::Tables;
use crate::types::{AllianceEvent, ClockTime, TrainInstanceId, TrainStatus};

/// How far ahead upcoming events are listed.
const EVENT_HORIZON_DAYS: i64 = 7;

/// How far ahead required trains are checked for a conductor.
const CONDUCTOR_ALERT_DAYS: i64 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCounts {
    pub total: usize,
    pub active: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayTrain {
    pub id: TrainInstanceId,
    pub status: TrainStatus,
    pub departure_time: ClockTime,
    pub real_departure_time: ClockTime,
    pub conductor: Option<MemberRef>,
    pub passenger_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Alert {
    MissingConductor {
        train_id: TrainInstanceId,
        date: NaiveDate,
        day_of_week: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub members: MemberCounts,
    pub upcoming_events: Vec<AllianceEvent>,
    pub today_train: Option<TodayTrain>,
    pub current_vs: Option<VsWeekSummary>,
    pub latest_desert_storm: Option<DesertStormView>,
    pub alerts: Vec<Alert>,
}

pub fn build(tables: &Tables, now: DateTime<Utc>) -> Dashboard {
    let today = now.date_naive();

    let members = MemberCounts {
        total: tables.members.len(),
        active: tables.members.values().filter(|m| m.is_active()).count(),
    };

    let today_train = trains::for_date(tables, today).map(|t| {
        let view = trains::view(tables, t);
        TodayTrain {
            id: t.id,
            status: t.status,
            departure_time: t.departure_time,
            real_departure_time: t.real_departure_time,
            conductor: view.conductor,
            passenger_count: view.passenger_count,
        }
    });

    Dashboard {
        members,
        upcoming_events: events::upcoming(
            tables,
            now,
            now + Duration::days(EVENT_HORIZON_DAYS),
        ),
        today_train,
        current_vs: vs::current(tables, today),
        latest_desert_storm: desert_storm::latest(tables),
        alerts: alerts(tables, today),
    }
}

fn alerts(tables: &Tables, today: NaiveDate) -> Vec<Alert> {
    let horizon = today + Duration::days(CONDUCTOR_ALERT_DAYS);
    let mut missing: Vec<_> = tables
        .trains
        .values()
        .filter(|t| !t.is_archived && t.is_required && t.conductor_id.is_none())
        .filter(|t| t.status != TrainStatus::Cancelled)
        .filter(|t| t.date >= today && t.date < horizon)
        .collect();
    missing.sort_by_key(|t| t.date);

    missing
        .into_iter()
        .map(|t| Alert::MissingConductor {
            train_id: t.id,
            date: t.date,
            day_of_week: t.day_of_week.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::generate_instances;
    use crate::test_utils::{insert_member, utc};
    use crate::types::TrainPassenger;

    #[test]
    fn empty_store_yields_empty_dashboard() {
        let d = build(&Tables::default(), utc(2026, 3, 9, 12, 0));
        assert_eq!(d.members, MemberCounts { total: 0, active: 0 });
        assert!(d.today_train.is_none());
        assert!(d.alerts.is_empty());
    }

    #[test]
    fn reports_today_train_and_conductor_alerts() {
        let mut tables = Tables::default();
        let now = utc(2026, 3, 12, 12, 0); // Thursday
        generate_instances(&mut tables, 14, now);
        let kestrel = insert_member(&mut tables, "Kestrel");
        let today = trains::for_date(&tables, now.date_naive()).unwrap().id;
        tables.trains.get_mut(today).unwrap().conductor_id = Some(kestrel);
        tables.passengers.push(TrainPassenger {
            train_instance_id: today,
            passenger_id: kestrel,
            joined_at: now,
        });

        let d = build(&tables, now);

        let train = d.today_train.unwrap();
        assert_eq!(train.id, today);
        assert_eq!(train.passenger_count, 1);
        assert_eq!(train.conductor.unwrap().pseudo, "Kestrel");
        // Friday is required and has no conductor; Saturday is optional.
        let dates: Vec<_> = d
            .alerts
            .iter()
            .map(|Alert::MissingConductor { date, .. }| date.to_string())
            .collect();
        assert_eq!(dates, ["2026-03-13"]);
    }

    #[test]
    fn alert_serializes_with_kind_tag() {
        let alert = Alert::MissingConductor {
            train_id: TrainInstanceId(3),
            date: NaiveDate::from_ymd_opt(2026, 3, 13).unwrap(),
            day_of_week: "Vendredi".into(),
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["kind"], "missingConductor");
        assert_eq!(json["trainId"], 3);
        assert_eq!(json["dayOfWeek"], "Vendredi");
    }
}
