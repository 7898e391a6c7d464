//! Password Reset Use Cases
//!
//! Two steps: request (mints a single-use token and mails it) and reset
//! (redeems the token and replaces the password). The request step is
//! enumeration-safe; a completed reset also clears any lockout and the
//! refresh token digest so stolen sessions die with the old password.

use std::sync::Arc;

use chrono::Utc;
use platform::crypto::{generate_opaque_token, sha256_hex};

use crate::application::config::AuthConfig;
use crate::application::mailer::{Mailer, password_reset_mail};
use crate::domain::policy::lockout;
use crate::domain::repository::{AccountRepository, CredentialsRepository};
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Returned whether or not the email is registered
pub const RESET_REQUEST_MESSAGE: &str =
    "If an account exists for that address, a password reset email has been sent.";

/// Request password reset use case
pub struct RequestPasswordResetUseCase<A, C, M>
where
    A: AccountRepository,
    C: CredentialsRepository,
    M: Mailer,
{
    account_repo: Arc<A>,
    credentials_repo: Arc<C>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<A, C, M> RequestPasswordResetUseCase<A, C, M>
where
    A: AccountRepository,
    C: CredentialsRepository,
    M: Mailer,
{
    pub fn new(
        account_repo: Arc<A>,
        credentials_repo: Arc<C>,
        mailer: Arc<M>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            account_repo,
            credentials_repo,
            mailer,
            config,
        }
    }

    pub async fn execute(&self, email: String) -> AuthResult<&'static str> {
        let email = Email::new(email)?;

        let Some(account) = self.account_repo.find_by_email(&email).await? else {
            tracing::info!("Password reset requested for an unknown email");
            return Ok(RESET_REQUEST_MESSAGE);
        };

        let mut credentials = self
            .credentials_repo
            .find_by_account_id(&account.account_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        // A new request replaces any outstanding token
        let reset_token = generate_opaque_token();
        credentials.reset_token_hash = Some(sha256_hex(reset_token.as_bytes()));
        credentials.reset_token_expires_at = Some(Utc::now() + self.config.reset_ttl());
        credentials.updated_at = Utc::now();
        self.credentials_repo.update(&credentials).await?;

        let (subject, body) = password_reset_mail(&self.config.frontend_url, &reset_token);
        if let Err(e) = self
            .mailer
            .send(account.email.as_str(), &subject, &body)
            .await
        {
            tracing::warn!(error = %e, "Failed to send password reset mail");
        }

        tracing::info!(public_id = %account.public_id, "Password reset requested");

        Ok(RESET_REQUEST_MESSAGE)
    }
}

/// Reset password use case
pub struct ResetPasswordUseCase<C>
where
    C: CredentialsRepository,
{
    credentials_repo: Arc<C>,
    config: Arc<AuthConfig>,
}

impl<C> ResetPasswordUseCase<C>
where
    C: CredentialsRepository,
{
    pub fn new(credentials_repo: Arc<C>, config: Arc<AuthConfig>) -> Self {
        Self {
            credentials_repo,
            config,
        }
    }

    pub async fn execute(&self, token: &str, new_password: String) -> AuthResult<()> {
        let digest = sha256_hex(token.as_bytes());

        let mut credentials = self
            .credentials_repo
            .find_by_reset_token_hash(&digest)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        let expires_at = credentials
            .reset_token_expires_at
            .ok_or(AuthError::TokenInvalid)?;
        if Utc::now() > expires_at {
            return Err(AuthError::TokenInvalid);
        }

        let raw = RawPassword::new(new_password)?;
        credentials.password_hash = UserPassword::from_raw(&raw, self.config.pepper())?;

        // Consume the token, clear any lockout, and kill the live session
        credentials.reset_token_hash = None;
        credentials.reset_token_expires_at = None;
        credentials.refresh_token_hash = None;
        lockout::reset(&mut credentials);

        self.credentials_repo.update(&credentials).await?;

        tracing::info!(account_id = %credentials.account_id, "Password reset completed");

        Ok(())
    }
}
