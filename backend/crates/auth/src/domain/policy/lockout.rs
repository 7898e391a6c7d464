//! Login Lockout Policy
//!
//! Counts consecutive password failures and locks the account for a
//! fixed window once the threshold is reached. The counter only resets
//! on a fully successful login (including the MFA step) or a completed
//! password reset, so the lock cannot be probed away.

use chrono::Utc;

use crate::domain::entity::credentials::Credentials;

/// Maximum login failures before temporary lockout
pub const MAX_LOGIN_FAILURES: u16 = 5;
/// Lockout duration in minutes
pub const LOCKOUT_MINUTES: i64 = 15;

/// Check if the account is currently locked.
///
/// An expired `locked_until` means the lock has lapsed; the stale
/// timestamp is cleared lazily on the next successful login.
pub fn is_locked(credentials: &Credentials) -> bool {
    match credentials.locked_until {
        Some(locked_until) => Utc::now() < locked_until,
        None => false,
    }
}

/// Record a failed login attempt.
///
/// Locks the account once the failure count reaches the threshold.
pub fn record_failure(credentials: &mut Credentials) {
    let now = Utc::now();
    credentials.login_failed_count += 1;
    credentials.last_failed_at = Some(now);
    credentials.updated_at = now;

    if credentials.login_failed_count >= MAX_LOGIN_FAILURES {
        credentials.locked_until = Some(now + chrono::Duration::minutes(LOCKOUT_MINUTES));
    }
}

/// Clear the failure count and any lock
pub fn reset(credentials: &mut Credentials) {
    credentials.login_failed_count = 0;
    credentials.last_failed_at = None;
    credentials.locked_until = None;
    credentials.updated_at = Utc::now();
}
