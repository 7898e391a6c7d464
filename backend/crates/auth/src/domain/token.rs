//! JWT Minting and Verification
//!
//! Two token kinds share one HS256 signing key and are kept apart by a
//! `token_type` claim, so a refresh token can never pass an access check.
//!
//! - Access tokens are short-lived and carry the role; they are verified
//!   statelessly on every request.
//! - Refresh tokens are long-lived and carry only the subject; the
//!   application layer additionally compares their digest against the
//!   one persisted on the account.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_object::{account_id::AccountId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

/// HS256 signing and verification keys derived from one secret
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// JWT claims
///
/// `role` is present on access tokens only.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account UUID
    pub sub: String,
    /// Role code, access tokens only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Discriminates access from refresh tokens
    pub token_type: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// Result of a successful access token check
#[derive(Debug, Clone)]
pub struct VerifiedAccess {
    pub account_id: AccountId,
    pub role: UserRole,
}

/// Mint a signed access token
pub fn mint_access(
    keys: &TokenKeys,
    account_id: &AccountId,
    role: UserRole,
    ttl: Duration,
) -> AuthResult<String> {
    mint(keys, account_id, Some(role), TOKEN_TYPE_ACCESS, ttl)
}

/// Mint a signed refresh token
pub fn mint_refresh(keys: &TokenKeys, account_id: &AccountId, ttl: Duration) -> AuthResult<String> {
    mint(keys, account_id, None, TOKEN_TYPE_REFRESH, ttl)
}

fn mint(
    keys: &TokenKeys,
    account_id: &AccountId,
    role: Option<UserRole>,
    token_type: &str,
    ttl: Duration,
) -> AuthResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: account_id.to_string(),
        role: role.map(|r| r.code().to_string()),
        token_type: token_type.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
        .map_err(|e| AuthError::Internal(format!("Failed to sign token: {}", e)))
}

/// Verify an access token and extract the caller's identity
pub fn verify_access(keys: &TokenKeys, token: &str) -> AuthResult<VerifiedAccess> {
    let claims = verify(keys, token, TOKEN_TYPE_ACCESS)?;

    let role_code = claims.role.ok_or(AuthError::TokenInvalid)?;
    let role = UserRole::from_code(&role_code).map_err(|_| AuthError::TokenInvalid)?;
    let account_id = parse_subject(&claims.sub)?;

    Ok(VerifiedAccess { account_id, role })
}

/// Verify a refresh token signature and expiry.
///
/// The digest comparison against the stored token happens in the
/// refresh use case; this only proves the token was minted by us.
pub fn verify_refresh(keys: &TokenKeys, token: &str) -> AuthResult<AccountId> {
    let claims = verify(keys, token, TOKEN_TYPE_REFRESH)?;
    parse_subject(&claims.sub)
}

fn verify(keys: &TokenKeys, token: &str, expected_type: &str) -> AuthResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    let data =
        decode::<Claims>(token, &keys.decoding, &validation).map_err(|_| AuthError::TokenInvalid)?;

    if data.claims.token_type != expected_type {
        return Err(AuthError::TokenInvalid);
    }

    Ok(data.claims)
}

fn parse_subject(sub: &str) -> AuthResult<AccountId> {
    Uuid::parse_str(sub)
        .map(AccountId::from_uuid)
        .map_err(|_| AuthError::TokenInvalid)
}
