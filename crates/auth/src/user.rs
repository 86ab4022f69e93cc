//! The authenticated user as seen by the application.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Permission, Role, permissions_for};

/// User returned by the identity provider after login.
///
/// The permission set is always derived from the role; it is never edited
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    email: String,
    role: Role,
    permissions: BTreeSet<Permission>,
}

impl AuthUser {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
            permissions: permissions_for(role),
        }
    }

    pub fn from_admin_flag(email: impl Into<String>, is_admin: bool) -> Self {
        Self::new(email, Role::from_admin_flag(is_admin))
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}
