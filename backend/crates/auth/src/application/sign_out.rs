//! Sign Out Use Case
//!
//! Clears the stored refresh token digest so the presented refresh token
//! can no longer mint access tokens. Idempotent: an unknown or already
//! cleared token is still a successful sign out.

use std::sync::Arc;

use chrono::Utc;
use platform::crypto::sha256_hex;

use crate::domain::repository::CredentialsRepository;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<C>
where
    C: CredentialsRepository,
{
    credentials_repo: Arc<C>,
}

impl<C> SignOutUseCase<C>
where
    C: CredentialsRepository,
{
    pub fn new(credentials_repo: Arc<C>) -> Self {
        Self { credentials_repo }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<()> {
        let digest = sha256_hex(refresh_token.as_bytes());

        if let Some(mut credentials) = self
            .credentials_repo
            .find_by_refresh_token_hash(&digest)
            .await?
        {
            credentials.refresh_token_hash = None;
            credentials.updated_at = Utc::now();
            self.credentials_repo.update(&credentials).await?;

            tracing::info!(account_id = %credentials.account_id, "Account signed out");
        }

        Ok(())
    }
}
