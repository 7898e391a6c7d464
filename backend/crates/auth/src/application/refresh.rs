//! Refresh Use Case
//!
//! Exchanges a valid refresh token for a new access token. The refresh
//! token itself is not rotated; it stays valid until logout, a password
//! reset, or the next login replaces it.

use std::sync::Arc;

use platform::crypto::{constant_time_eq, sha256_hex};

use crate::application::config::AuthConfig;
use crate::domain::repository::{AccountRepository, CredentialsRepository};
use crate::domain::token;
use crate::error::{AuthError, AuthResult};

/// Refresh output
#[derive(Debug)]
pub struct RefreshOutput {
    pub access_token: String,
    pub expires_in_secs: u64,
}

/// Refresh use case
pub struct RefreshUseCase<A, C>
where
    A: AccountRepository,
    C: CredentialsRepository,
{
    account_repo: Arc<A>,
    credentials_repo: Arc<C>,
    config: Arc<AuthConfig>,
}

impl<A, C> RefreshUseCase<A, C>
where
    A: AccountRepository,
    C: CredentialsRepository,
{
    pub fn new(account_repo: Arc<A>, credentials_repo: Arc<C>, config: Arc<AuthConfig>) -> Self {
        Self {
            account_repo,
            credentials_repo,
            config,
        }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<RefreshOutput> {
        let keys = self.config.token_keys();

        // Signature and expiry first, then the server-side digest check
        let account_id = token::verify_refresh(&keys, refresh_token)?;

        let credentials = self
            .credentials_repo
            .find_by_account_id(&account_id)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        let stored = credentials
            .refresh_token_hash
            .as_deref()
            .ok_or(AuthError::TokenInvalid)?;

        // A signed token that was rotated out or cleared no longer counts
        let presented = sha256_hex(refresh_token.as_bytes());
        if !constant_time_eq(stored.as_bytes(), presented.as_bytes()) {
            return Err(AuthError::TokenInvalid);
        }

        // Role is read fresh so a demotion takes effect on next refresh
        let account = self
            .account_repo
            .find_by_id(&account_id)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        let access_token = token::mint_access(
            &keys,
            &account.account_id,
            account.user_role,
            self.config.access_ttl(),
        )?;

        tracing::debug!(public_id = %account.public_id, "Access token refreshed");

        Ok(RefreshOutput {
            access_token,
            expires_in_secs: self.config.access_token_ttl.as_secs(),
        })
    }
}
