//! Verify Email Use Case
//!
//! Redeems a single-use verification token. The digest is cleared on
//! success, so replaying the same link fails with the same error as an
//! unknown token.

use std::sync::Arc;

use chrono::Utc;
use platform::crypto::sha256_hex;

use crate::domain::repository::{AccountRepository, CredentialsRepository};
use crate::error::{AuthError, AuthResult};

/// Verify email use case
pub struct VerifyEmailUseCase<A, C>
where
    A: AccountRepository,
    C: CredentialsRepository,
{
    account_repo: Arc<A>,
    credentials_repo: Arc<C>,
}

impl<A, C> VerifyEmailUseCase<A, C>
where
    A: AccountRepository,
    C: CredentialsRepository,
{
    pub fn new(account_repo: Arc<A>, credentials_repo: Arc<C>) -> Self {
        Self {
            account_repo,
            credentials_repo,
        }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<()> {
        let digest = sha256_hex(token.as_bytes());

        let mut credentials = self
            .credentials_repo
            .find_by_verify_token_hash(&digest)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        let expires_at = credentials
            .verify_token_expires_at
            .ok_or(AuthError::TokenInvalid)?;
        if Utc::now() > expires_at {
            return Err(AuthError::TokenInvalid);
        }

        let mut account = self
            .account_repo
            .find_by_id(&credentials.account_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Account missing for credentials".to_string()))?;

        let now = Utc::now();
        account.email_verified = true;
        account.updated_at = now;
        self.account_repo.update(&account).await?;

        // Consume the token
        credentials.verify_token_hash = None;
        credentials.verify_token_expires_at = None;
        credentials.updated_at = now;
        self.credentials_repo.update(&credentials).await?;

        tracing::info!(public_id = %account.public_id, "Email verified");

        Ok(())
    }
}
