//! Credentials Entity
//!
//! Sensitive authentication state for an account:
//! - Password hash
//! - TOTP secret (for MFA)
//! - Login failure tracking and lockout window
//! - Digests of the refresh, reset, and verification tokens
//!
//! Plain data holder; lockout transitions live in `domain::policy::lockout`.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    account_id::AccountId, totp_secret::TotpSecret, user_password::UserPassword,
};

/// Credentials entity
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Reference to the owning Account
    pub account_id: AccountId,
    /// Hashed password (Argon2id PHC string)
    pub password_hash: UserPassword,
    /// TOTP secret, present once MFA enrollment has started
    pub totp_secret: Option<TotpSecret>,
    /// Whether MFA has been verified and is enforced at login
    pub totp_enabled: bool,
    /// Consecutive login failure count
    pub login_failed_count: u16,
    /// Last login failure time
    pub last_failed_at: Option<DateTime<Utc>>,
    /// Account locked until (temporary lockout after failures)
    pub locked_until: Option<DateTime<Utc>>,
    /// SHA-256 hex digest of the current refresh token.
    /// The raw token is never persisted.
    pub refresh_token_hash: Option<String>,
    /// SHA-256 hex digest of an outstanding password reset token
    pub reset_token_hash: Option<String>,
    /// Reset token expiry
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    /// SHA-256 hex digest of an outstanding email verification token
    pub verify_token_hash: Option<String>,
    /// Verification token expiry
    pub verify_token_expires_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Credentials {
    /// Create new credentials for an account
    pub fn new(account_id: AccountId, password_hash: UserPassword) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            password_hash,
            totp_secret: None,
            totp_enabled: false,
            login_failed_count: 0,
            last_failed_at: None,
            locked_until: None,
            refresh_token_hash: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            verify_token_hash: None,
            verify_token_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
