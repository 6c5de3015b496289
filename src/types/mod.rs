//! Core domain types for the alliance hub.
//!
//! Row types for every table in the store, plus the small value types
//! (`ClockTime`, identifiers) they are built from.

pub mod clock;
pub mod desert_storm;
pub mod event;
pub mod help;
pub mod ids;
pub mod import;
pub mod member;
pub mod reference;
pub mod train;
pub mod vs;

pub use clock::{ClockTime, InvalidClockTime};
pub use desert_storm::{DesertStorm, RosterEntry, Team};
pub use event::AllianceEvent;
pub use help::HelpArticle;
pub use ids::{
    DesertStormId, EventId, HelpArticleId, ImportLogId, MemberId, ReferenceId, TrainInstanceId,
    VsWeekId,
};
pub use import::{DataKind, FileFormat, ImportLog, RowError};
pub use member::{Member, MemberStatus};
pub use reference::{ReferenceCategory, ReferenceItem};
pub use train::{HistoryAction, TrainHistoryEntry, TrainInstance, TrainPassenger, TrainStatus};
pub use vs::{MatchResult, VsDay, VsParticipant, VsWeek};
