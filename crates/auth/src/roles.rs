use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role held by an authenticated user.
///
/// The identity provider exposes only an admin flag, so two roles exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin { Role::Admin } else { Role::User }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

const USER_PERMISSIONS: &[Permission] = &[
    Permission::ViewDashboard,
    Permission::ViewItems,
    Permission::CreateEntry,
    Permission::CreateExit,
    Permission::ViewEntriesHistory,
    Permission::ViewExitsHistory,
    Permission::ViewReports,
    Permission::CreateOrder,
];

/// Static role → permission table.
pub fn permissions_for(role: Role) -> BTreeSet<Permission> {
    match role {
        Role::Admin => Permission::ALL.into_iter().collect(),
        Role::User => USER_PERMISSIONS.iter().copied().collect(),
    }
}
