use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum UserRole {
    #[default]
    User = 0,
    Admin = 1,
}

impl UserRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "user",
            Admin => "admin",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    #[inline]
    pub fn from_id(id: i16) -> AppResult<Self> {
        use UserRole::*;
        match id {
            0 => Ok(User),
            1 => Ok(Admin),
            _ => Err(AppError::internal(format!("Invalid UserRole id: {}", id))),
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> AppResult<Self> {
        use UserRole::*;
        match code {
            "user" => Ok(User),
            "admin" => Ok(Admin),
            _ => Err(AppError::bad_request(format!(
                "Invalid UserRole code: {}",
                code
            ))),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_id() {
        assert_eq!(UserRole::from_id(0).unwrap(), UserRole::User);
        assert_eq!(UserRole::from_id(1).unwrap(), UserRole::Admin);
        assert!(UserRole::from_id(7).is_err());
    }

    #[test]
    fn test_user_role_from_code() {
        assert_eq!(UserRole::from_code("user").unwrap(), UserRole::User);
        assert_eq!(UserRole::from_code("admin").unwrap(), UserRole::Admin);
        assert!(UserRole::from_code("superuser").is_err());
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::User.to_string(), "user");
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_user_role_checks() {
        assert!(!UserRole::User.is_admin());
        assert!(UserRole::Admin.is_admin());
        assert_eq!(UserRole::default(), UserRole::User);
    }
}
