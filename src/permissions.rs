//! Role-based permission table.
//!
//! A flat lookup from [`Role`] to the set of [`Permission`]s it holds. The
//! table lives in the store so admins can edit it; the admin role always
//! holds every permission regardless of what is stored.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Officer,
    Member,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Officer, Role::Member];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Officer => "officer",
            Role::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}

/// An action string checked before a route runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "dashboard.view")]
    DashboardView,
    #[serde(rename = "members.view")]
    MembersView,
    #[serde(rename = "members.edit")]
    MembersEdit,
    #[serde(rename = "members.delete")]
    MembersDelete,
    #[serde(rename = "events.view")]
    EventsView,
    #[serde(rename = "events.edit")]
    EventsEdit,
    #[serde(rename = "trains.view")]
    TrainsView,
    #[serde(rename = "trains.join")]
    TrainsJoin,
    #[serde(rename = "trains.manage")]
    TrainsManage,
    #[serde(rename = "vs.view")]
    VsView,
    #[serde(rename = "vs.edit")]
    VsEdit,
    #[serde(rename = "desert_storm.view")]
    DesertStormView,
    #[serde(rename = "desert_storm.edit")]
    DesertStormEdit,
    #[serde(rename = "help.view")]
    HelpView,
    #[serde(rename = "help.edit")]
    HelpEdit,
    #[serde(rename = "reference.view")]
    ReferenceView,
    #[serde(rename = "reference.edit")]
    ReferenceEdit,
    #[serde(rename = "import.run")]
    ImportRun,
    #[serde(rename = "export.run")]
    ExportRun,
    #[serde(rename = "permissions.edit")]
    PermissionsEdit,
}

impl Permission {
    pub const ALL: [Permission; 20] = [
        Permission::DashboardView,
        Permission::MembersView,
        Permission::MembersEdit,
        Permission::MembersDelete,
        Permission::EventsView,
        Permission::EventsEdit,
        Permission::TrainsView,
        Permission::TrainsJoin,
        Permission::TrainsManage,
        Permission::VsView,
        Permission::VsEdit,
        Permission::DesertStormView,
        Permission::DesertStormEdit,
        Permission::HelpView,
        Permission::HelpEdit,
        Permission::ReferenceView,
        Permission::ReferenceEdit,
        Permission::ImportRun,
        Permission::ExportRun,
        Permission::PermissionsEdit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::DashboardView => "dashboard.view",
            Permission::MembersView => "members.view",
            Permission::MembersEdit => "members.edit",
            Permission::MembersDelete => "members.delete",
            Permission::EventsView => "events.view",
            Permission::EventsEdit => "events.edit",
            Permission::TrainsView => "trains.view",
            Permission::TrainsJoin => "trains.join",
            Permission::TrainsManage => "trains.manage",
            Permission::VsView => "vs.view",
            Permission::VsEdit => "vs.edit",
            Permission::DesertStormView => "desert_storm.view",
            Permission::DesertStormEdit => "desert_storm.edit",
            Permission::HelpView => "help.view",
            Permission::HelpEdit => "help.edit",
            Permission::ReferenceView => "reference.view",
            Permission::ReferenceEdit => "reference.edit",
            Permission::ImportRun => "import.run",
            Permission::ExportRun => "export.run",
            Permission::PermissionsEdit => "permissions.edit",
        }
    }

    /// Read-only permissions every role starts with.
    fn is_view(&self) -> bool {
        self.as_str().ends_with(".view")
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role → permission mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTable {
    grants: BTreeMap<Role, BTreeSet<Permission>>,
}

impl Default for PermissionTable {
    fn default() -> Self {
        let views: BTreeSet<Permission> =
            Permission::ALL.into_iter().filter(Permission::is_view).collect();

        let mut officer = views.clone();
        officer.extend([
            Permission::MembersEdit,
            Permission::EventsEdit,
            Permission::TrainsJoin,
            Permission::TrainsManage,
            Permission::VsEdit,
            Permission::DesertStormEdit,
            Permission::HelpEdit,
            Permission::ExportRun,
        ]);

        let mut member = views;
        member.insert(Permission::TrainsJoin);

        let mut grants = BTreeMap::new();
        grants.insert(Role::Admin, Permission::ALL.into_iter().collect());
        grants.insert(Role::Officer, officer);
        grants.insert(Role::Member, member);
        PermissionTable { grants }
    }
}

impl PermissionTable {
    /// Returns true if `role` holds `permission`.
    pub fn allows(&self, role: Role, permission: Permission) -> bool {
        role == Role::Admin
            || self
                .grants
                .get(&role)
                .is_some_and(|set| set.contains(&permission))
    }

    /// Returns the effective permissions for a role.
    pub fn permissions_of(&self, role: Role) -> BTreeSet<Permission> {
        if role == Role::Admin {
            return Permission::ALL.into_iter().collect();
        }
        self.grants.get(&role).cloned().unwrap_or_default()
    }

    /// Replaces the grants for the given roles. Admin entries are ignored.
    pub fn update(&mut self, changes: BTreeMap<Role, BTreeSet<Permission>>) {
        for (role, permissions) in changes {
            if role != Role::Admin {
                self.grants.insert(role, permissions);
            }
        }
    }

    /// Effective table for every role.
    pub fn effective(&self) -> BTreeMap<Role, BTreeSet<Permission>> {
        Role::ALL
            .into_iter()
            .map(|role| (role, self.permissions_of(role)))
            .collect()
    }
}
