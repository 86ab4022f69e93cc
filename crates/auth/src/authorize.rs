use thiserror::Error;

use crate::{AuthUser, Permission};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),
}

/// Check a permission at an operation boundary.
///
/// - No IO
/// - No panics
/// - Pure policy check against the role-derived set
pub fn authorize(user: &AuthUser, required: Permission) -> Result<(), AuthzError> {
    if user.can(required) {
        Ok(())
    } else {
        tracing::warn!(
            email = user.email(),
            role = %user.role(),
            permission = %required,
            "authorization denied"
        );
        Err(AuthzError::Forbidden(required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[test]
    fn grants_permissions_in_the_role_table() {
        let user = AuthUser::new("a@b.c", Role::User);
        assert_eq!(authorize(&user, Permission::CreateExit), Ok(()));
    }

    #[test]
    fn denies_missing_permission_with_its_key() {
        let user = AuthUser::new("a@b.c", Role::User);
        let err = authorize(&user, Permission::ManageUsers).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden(Permission::ManageUsers));
        assert_eq!(err.to_string(), "forbidden: missing permission 'manage-users'");
    }

    #[test]
    fn admin_passes_every_check() {
        let admin = AuthUser::new("root@b.c", Role::Admin);
        for perm in Permission::ALL {
            assert!(authorize(&admin, perm).is_ok());
        }
    }
}
