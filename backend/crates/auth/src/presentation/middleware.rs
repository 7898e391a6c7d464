//! Auth Middleware
//!
//! Bearer access token verification for protected routes. Verification
//! is stateless: the signature and expiry are checked against the
//! configured key, no storage lookup. On success the caller's identity
//! is inserted into request extensions as `AuthContext`.

use axum::body::Body;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::token;
use crate::domain::value_object::{account_id::AccountId, user_role::UserRole};
use crate::error::AuthError;

/// Middleware state
#[derive(Clone)]
pub struct AuthTokenState {
    pub config: Arc<AuthConfig>,
}

/// Verified caller identity, available to handlers via `Extension`
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account_id: AccountId,
    pub role: UserRole,
}

/// Middleware that requires a valid Bearer access token
pub async fn require_access_token(
    state: AuthTokenState,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AuthError::TokenInvalid.into_response())?;

    let keys = state.config.token_keys();
    let verified = token::verify_access(&keys, &token).map_err(|e| e.into_response())?;

    req.extensions_mut().insert(AuthContext {
        account_id: verified.account_id,
        role: verified.role,
    });

    Ok(next.run(req).await)
}

/// Extract the token from an `Authorization: Bearer ...` header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_or_malformed() {
        assert!(bearer_token(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert!(bearer_token(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_none());
    }
}
