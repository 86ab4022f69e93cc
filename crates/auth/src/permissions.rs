use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Permission key gating one screen or operation.
///
/// The set is closed: every gated operation names one of these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    ViewDashboard,
    ViewItems,
    CreateEntry,
    CreateExit,
    ViewEntriesHistory,
    ViewExitsHistory,
    ViewReports,
    CreateOrder,
    ManageOrders,
    ManageUsers,
    CreateItems,
}

impl Permission {
    pub const ALL: [Permission; 11] = [
        Permission::ViewDashboard,
        Permission::ViewItems,
        Permission::CreateEntry,
        Permission::CreateExit,
        Permission::ViewEntriesHistory,
        Permission::ViewExitsHistory,
        Permission::ViewReports,
        Permission::CreateOrder,
        Permission::ManageOrders,
        Permission::ManageUsers,
        Permission::CreateItems,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewDashboard => "view-dashboard",
            Permission::ViewItems => "view-items",
            Permission::CreateEntry => "create-entry",
            Permission::CreateExit => "create-exit",
            Permission::ViewEntriesHistory => "view-entries-history",
            Permission::ViewExitsHistory => "view-exits-history",
            Permission::ViewReports => "view-reports",
            Permission::CreateOrder => "create-order",
            Permission::ManageOrders => "manage-orders",
            Permission::ManageUsers => "manage-users",
            Permission::CreateItems => "create-items",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission key '{0}'")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}
