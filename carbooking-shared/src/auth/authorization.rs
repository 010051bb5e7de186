/// Role-based authorization checks
///
/// Two roles exist: `ROLE_ADMIN` manages the fleet and every booking,
/// `ROLE_USER` books cars and manages its own bookings. A user may hold both.
/// Checks run against the roles carried in the access token.
///
/// # Example
///
/// ```no_run
/// use carbooking_shared::auth::authorization::{require_role, require_owner_or_admin};
/// use carbooking_shared::auth::middleware::AuthContext;
/// use carbooking_shared::models::role::Role;
///
/// fn check(auth: &AuthContext, booking_owner: i64) -> Result<(), Box<dyn std::error::Error>> {
///     require_role(auth, Role::Admin)?;
///     require_owner_or_admin(auth, booking_owner)?;
///     Ok(())
/// }
/// ```

use super::middleware::AuthContext;
use crate::models::role::Role;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller holds none of the required roles
    #[error("Access denied: requires {}", format_roles(.0))]
    MissingRole(Vec<Role>),

    /// Caller neither owns the resource nor is an admin
    #[error("Not authorized to access this resource")]
    NotOwner,
}

fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Requires the caller to hold `role`
pub fn require_role(auth: &AuthContext, role: Role) -> Result<(), AuthzError> {
    require_any_role(auth, &[role])
}

/// Requires the caller to hold at least one of `roles`
pub fn require_any_role(auth: &AuthContext, roles: &[Role]) -> Result<(), AuthzError> {
    if roles.iter().any(|role| auth.has_role(*role)) {
        Ok(())
    } else {
        Err(AuthzError::MissingRole(roles.to_vec()))
    }
}

/// Requires the caller to own the resource or be an admin
pub fn require_owner_or_admin(auth: &AuthContext, owner_id: i64) -> Result<(), AuthzError> {
    if auth.can_access(owner_id) {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(user_id: i64, roles: Vec<Role>) -> AuthContext {
        AuthContext {
            user_id,
            username: format!("user{}", user_id),
            roles,
        }
    }

    #[test]
    fn test_require_role() {
        let admin = context(1, vec![Role::Admin]);
        let user = context(2, vec![Role::User]);

        assert!(require_role(&admin, Role::Admin).is_ok());
        assert_eq!(
            require_role(&user, Role::Admin),
            Err(AuthzError::MissingRole(vec![Role::Admin]))
        );
    }

    #[test]
    fn test_require_any_role() {
        let manager = context(4, vec![Role::Admin, Role::User]);
        let nobody = context(5, vec![]);

        assert!(require_any_role(&manager, &[Role::User, Role::Admin]).is_ok());
        assert!(require_any_role(&nobody, &[Role::User, Role::Admin]).is_err());
    }

    #[test]
    fn test_require_owner_or_admin() {
        let owner = context(2, vec![Role::User]);
        let other = context(3, vec![Role::User]);
        let admin = context(1, vec![Role::Admin]);

        assert!(require_owner_or_admin(&owner, 2).is_ok());
        assert_eq!(require_owner_or_admin(&other, 2), Err(AuthzError::NotOwner));
        assert!(require_owner_or_admin(&admin, 2).is_ok());
    }

    #[test]
    fn test_authz_error_display() {
        let err = AuthzError::MissingRole(vec![Role::User, Role::Admin]);
        assert_eq!(err.to_string(), "Access denied: requires ROLE_USER or ROLE_ADMIN");

        assert!(AuthzError::NotOwner.to_string().contains("Not authorized"));
    }
}
