//! Account Entity
//!
//! Core account profile containing non-sensitive data.
//! Entities are plain data holders; lifecycle rules live in
//! `domain::policy` free functions and the application layer.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    account_id::AccountId, email::Email, public_id::PublicId, user_name::UserName,
    user_role::UserRole,
};

/// Account entity
///
/// Sensitive auth data (password hash, MFA secret, token digests)
/// lives in the Credentials entity.
#[derive(Debug, Clone)]
pub struct Account {
    /// Internal UUID identifier
    pub account_id: AccountId,
    /// Public-facing nanoid identifier (URL-safe)
    pub public_id: PublicId,
    /// Display name
    pub user_name: UserName,
    /// Login email (unique, lowercased)
    pub email: Email,
    /// Role (User, Admin)
    pub user_role: UserRole,
    /// Whether ownership of the email has been proven
    pub email_verified: bool,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new unverified account with the default role
    pub fn new(user_name: UserName, email: Email) -> Self {
        let now = Utc::now();

        Self {
            account_id: AccountId::new(),
            public_id: PublicId::new(),
            user_name,
            email,
            user_role: UserRole::default(),
            email_verified: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
