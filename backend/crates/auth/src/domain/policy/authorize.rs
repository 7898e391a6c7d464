//! Role Authorization Policy
//!
//! Explicit role checks instead of middleware closures: handlers state
//! which roles they accept and call `require` with the caller's role.

use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Check whether a role is in the allowed set
pub fn is_allowed(role: UserRole, allowed: &[UserRole]) -> bool {
    allowed.contains(&role)
}

/// Require the caller's role to be in the allowed set
pub fn require(role: UserRole, allowed: &[UserRole]) -> AuthResult<()> {
    if is_allowed(role, allowed) {
        Ok(())
    } else {
        Err(AuthError::RoleDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_allowed() {
        assert!(is_allowed(UserRole::Admin, &[UserRole::Admin]));
        assert!(is_allowed(
            UserRole::User,
            &[UserRole::User, UserRole::Admin]
        ));
        assert!(!is_allowed(UserRole::User, &[UserRole::Admin]));
    }

    #[test]
    fn test_require_denies_with_forbidden() {
        assert!(require(UserRole::Admin, &[UserRole::Admin]).is_ok());

        let err = require(UserRole::User, &[UserRole::Admin]).unwrap_err();
        assert!(matches!(err, AuthError::RoleDenied));
    }
}
