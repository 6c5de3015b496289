//! The full set of tables held by the store.

use serde::{Deserialize, Serialize};

use super::audit::AuditPayload;
use super::table::{Row, Table};
use crate::permissions::PermissionTable;
use crate::types::{
    AllianceEvent, DesertStorm, DesertStormId, EventId, HelpArticle, HelpArticleId, ImportLog,
    ImportLogId, Member, MemberId, ReferenceId, ReferenceItem, TrainHistoryEntry, TrainInstance,
    TrainInstanceId, TrainPassenger, VsDay, VsParticipant, VsWeek, VsWeekId,
};

macro_rules! impl_row {
    ($row:ty, $id:ty) => {
        impl Row for $row {
            type Id = $id;

            fn id(&self) -> $id {
                self.id
            }
        }
    };
}

impl_row!(Member, MemberId);
impl_row!(AllianceEvent, EventId);
impl_row!(TrainInstance, TrainInstanceId);
impl_row!(VsWeek, VsWeekId);
impl_row!(DesertStorm, DesertStormId);
impl_row!(HelpArticle, HelpArticleId);
impl_row!(ReferenceItem, ReferenceId);
impl_row!(ImportLog, ImportLogId);

/// Import logs kept in the snapshot; older runs are dropped.
pub const MAX_IMPORT_LOGS: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tables {
    pub members: Table<Member>,
    pub events: Table<AllianceEvent>,
    pub trains: Table<TrainInstance>,
    pub passengers: Vec<TrainPassenger>,
    pub vs_weeks: Table<VsWeek>,
    pub vs_days: Vec<VsDay>,
    pub vs_participants: Vec<VsParticipant>,
    pub desert_storms: Table<DesertStorm>,
    pub help_articles: Table<HelpArticle>,
    pub reference: Table<ReferenceItem>,
    pub permissions: PermissionTable,
    pub import_logs: Table<ImportLog>,

    /// Audit records produced by the current transaction, appended to the
    /// audit log once the snapshot is durable.
    #[serde(skip)]
    pending_audit: Vec<AuditPayload>,
}

impl Tables {
    /// Queues an audit record for the current transaction.
    pub fn audit(&mut self, payload: AuditPayload) {
        self.pending_audit.push(payload);
    }

    /// Queues a train history row.
    pub fn record_train(&mut self, entry: TrainHistoryEntry) {
        self.audit(AuditPayload::Train(entry));
    }

    pub(super) fn take_pending_audit(&mut self) -> Vec<AuditPayload> {
        std::mem::take(&mut self.pending_audit)
    }

    #[cfg(test)]
    pub fn pending_audit(&self) -> &[AuditPayload] {
        &self.pending_audit
    }

    pub fn member_by_pseudo(&self, pseudo: &str) -> Option<&Member> {
        self.members.find(|m| m.has_pseudo(pseudo))
    }

    pub fn passengers_of(&self, train: TrainInstanceId) -> impl Iterator<Item = &TrainPassenger> {
        self.passengers
            .iter()
            .filter(move |p| p.train_instance_id == train)
    }

    /// Drops the oldest import logs beyond [`MAX_IMPORT_LOGS`].
    pub fn trim_import_logs(&mut self) {
        let excess = self.import_logs.len().saturating_sub(MAX_IMPORT_LOGS);
        if excess == 0 {
            return;
        }
        let oldest: Vec<ImportLogId> = self.import_logs.values().take(excess).map(|l| l.id).collect();
        for id in oldest {
            self.import_logs.remove(id);
        }
    }
}
