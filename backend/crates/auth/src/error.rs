//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Account not found
    #[error("Account not found")]
    AccountNotFound,

    /// Invalid credentials (unknown email or wrong password)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Email ownership not yet proven
    #[error("Please verify your email before logging in")]
    EmailNotVerified,

    /// Account is locked (too many failed attempts)
    #[error("Account is temporarily locked due to too many failed login attempts")]
    AccountLocked,

    /// MFA is enabled but no code was supplied
    #[error("Multi-factor authentication code required")]
    MfaRequired,

    /// Invalid MFA code
    #[error("Invalid multi-factor authentication code")]
    InvalidMfaCode,

    /// MFA not set up
    #[error("Multi-factor authentication is not set up")]
    MfaNotSetup,

    /// Missing, malformed, expired, or already-used token
    #[error("Invalid or expired token")]
    TokenInvalid,

    /// Caller's role is not in the allowed set
    #[error("Insufficient permissions")]
    RoleDenied,

    /// Request validation error
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Too many requests from this client
    #[error("Too many requests, please try again later")]
    RateLimited,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AccountNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidCredentials
            | AuthError::EmailNotVerified
            | AuthError::MfaRequired
            | AuthError::InvalidMfaCode
            | AuthError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AuthError::AccountLocked => StatusCode::LOCKED,
            AuthError::MfaNotSetup => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::RoleDenied => StatusCode::FORBIDDEN,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::InvalidCredentials
            | AuthError::EmailNotVerified
            | AuthError::MfaRequired
            | AuthError::InvalidMfaCode
            | AuthError::TokenInvalid => ErrorKind::Unauthorized,
            AuthError::AccountLocked => ErrorKind::Locked,
            AuthError::MfaNotSetup => ErrorKind::UnprocessableEntity,
            AuthError::RoleDenied => ErrorKind::Forbidden,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::RateLimited => ErrorKind::TooManyRequests,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountLocked => {
                tracing::warn!("Login attempt on locked account");
            }
            AuthError::RateLimited => {
                tracing::warn!("Rate limited request");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();

        // The MFA challenge carries an extra flag so clients can prompt
        // for a code instead of treating it as a failed login.
        if matches!(self, AuthError::MfaRequired) {
            let status = self.status_code();
            let body = serde_json::json!({
                "type": format!("https://httpstatuses.io/{}", status.as_u16()),
                "title": self.kind().as_str(),
                "status": status.as_u16(),
                "detail": self.to_string(),
                "action": serde_json::Value::Null,
                "mfaRequired": true,
            });
            return (status, axum::Json(body)).into_response();
        }

        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest | ErrorKind::UnprocessableEntity => {
                AuthError::Validation(err.message().to_string())
            }
            ErrorKind::NotFound => AuthError::AccountNotFound,
            _ => AuthError::Internal(err.message().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::AccountLocked.status_code(),
            StatusCode::LOCKED // 423
        );
        assert_eq!(
            AuthError::MfaRequired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::RoleDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_kind_matches_status() {
        for err in [
            AuthError::AccountNotFound,
            AuthError::InvalidCredentials,
            AuthError::AccountLocked,
            AuthError::TokenInvalid,
            AuthError::RoleDenied,
            AuthError::RateLimited,
        ] {
            assert_eq!(err.kind().status_code(), err.status_code().as_u16());
        }
    }
}
