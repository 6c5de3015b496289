//! Shared test fixtures and arbitrary generators for property-based testing.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

use crate::store::Tables;
use crate::types::train::real_departure_for;
use crate::types::{
    ClockTime, Member, MemberId, MemberStatus, TrainInstance, TrainInstanceId, TrainStatus,
};

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn insert_member(tables: &mut Tables, pseudo: &str) -> MemberId {
    let now = utc(2026, 1, 1, 0, 0);
    tables
        .members
        .insert_with(|id| Member {
            id,
            pseudo: pseudo.to_string(),
            level: 1,
            power: 0,
            alliance_role: None,
            specialty: None,
            tags: Vec::new(),
            status: MemberStatus::Active,
            notes: None,
            created_at: now,
            updated_at: now,
        })
        .id
}

pub fn insert_train(
    tables: &mut Tables,
    date: NaiveDate,
    departure: &str,
    status: TrainStatus,
) -> TrainInstanceId {
    let departure_time: ClockTime = departure.parse().unwrap();
    let now = utc(2026, 1, 1, 0, 0);
    tables
        .trains
        .insert_with(|id| TrainInstance {
            id,
            date,
            day_of_week: crate::scheduler::template::day_name(chrono::Datelike::weekday(&date))
                .to_string(),
            departure_time,
            real_departure_time: real_departure_for(departure_time),
            is_required: true,
            status,
            is_archived: false,
            conductor_id: None,
            created_at: now,
            updated_at: now,
        })
        .id
}

/// Instants between 2024 and 2030, minute precision.
pub fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    let start = utc(2024, 1, 1, 0, 0).timestamp() / 60;
    let end = utc(2030, 1, 1, 0, 0).timestamp() / 60;
    (start..end).prop_map(|minutes| Utc.timestamp_opt(minutes * 60, 0).unwrap())
}

pub fn arb_clock_time() -> impl Strategy<Value = ClockTime> {
    (0u8..24, 0u8..60).prop_map(|(h, m)| ClockTime::new(h, m).unwrap())
}

pub fn arb_pseudo() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{2,15}".prop_map(String::from)
}

/// Arbitrary CSV field content, including the characters that force quoting.
pub fn arb_csv_field() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,12}".prop_map(String::from),
        "[a-z,\"\n ]{0,12}".prop_map(String::from),
        "[a-z\r\n]{0,6}".prop_map(String::from),
    ]
}
