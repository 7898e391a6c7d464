//! User Name Value Object
//!
//! Display name shown alongside the account. Not used for login
//! (login is by email), so the rules are deliberately loose:
//! NFKC-normalized, trimmed, 1 to 50 characters.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Maximum user name length in characters (after normalization)
pub const USER_NAME_MAX_CHARS: usize = 50;

/// User display name value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    /// Create a new user name with validation.
    ///
    /// Applies NFKC normalization so visually equivalent names
    /// compare equal, then trims surrounding whitespace.
    pub fn new(name: impl AsRef<str>) -> AppResult<Self> {
        let normalized: String = name.as_ref().nfkc().collect();
        let trimmed = normalized.trim();

        if trimmed.is_empty() {
            return Err(AppError::bad_request("User name cannot be empty"));
        }

        let char_count = trimmed.chars().count();
        if char_count > USER_NAME_MAX_CHARS {
            return Err(AppError::bad_request(format!(
                "User name must be at most {} characters",
                USER_NAME_MAX_CHARS
            )));
        }

        if trimmed.chars().any(char::is_control) {
            return Err(AppError::bad_request(
                "User name cannot contain control characters",
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> AppResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(AppError::internal("Stored user name is empty"));
        }
        Ok(Self(name))
    }

    /// Get the user name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to string for database storage
    pub fn into_db(self) -> String {
        self.0
    }
}

impl std::fmt::Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_name_valid() {
        assert!(UserName::new("alice").is_ok());
        assert!(UserName::new("Alice Liddell").is_ok());
        assert!(UserName::new("日本語ユーザー").is_ok());
        assert!(UserName::new("a").is_ok());
    }

    #[test]
    fn test_user_name_empty() {
        assert!(UserName::new("").is_err());
        assert!(UserName::new("   ").is_err());
    }

    #[test]
    fn test_user_name_too_long() {
        let name = "a".repeat(USER_NAME_MAX_CHARS + 1);
        assert!(UserName::new(&name).is_err());

        let name = "a".repeat(USER_NAME_MAX_CHARS);
        assert!(UserName::new(&name).is_ok());
    }

    #[test]
    fn test_user_name_nfkc_normalization() {
        // Full-width Latin normalizes to ASCII under NFKC
        let name = UserName::new("Ａｌｉｃｅ").unwrap();
        assert_eq!(name.as_str(), "Alice");
    }

    #[test]
    fn test_user_name_control_characters() {
        assert!(UserName::new("ali\x00ce").is_err());
        assert!(UserName::new("ali\nce").is_err());
    }

    #[test]
    fn test_user_name_trimmed() {
        let name = UserName::new("  alice  ").unwrap();
        assert_eq!(name.as_str(), "alice");
    }
}
