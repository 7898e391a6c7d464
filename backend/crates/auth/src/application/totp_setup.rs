//! TOTP Setup Use Case
//!
//! Enroll, verify, and disable TOTP-based multi-factor authentication.
//! A freshly provisioned secret does not gate logins until the owner
//! proves possession of it by verifying one code.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::repository::{AccountRepository, CredentialsRepository};
use crate::domain::value_object::{account_id::AccountId, totp_secret::TotpSecret};
use crate::error::{AuthError, AuthResult};

/// TOTP setup output
pub struct TotpSetupOutput {
    /// QR code as base64-encoded PNG
    pub qr_code_base64: String,
    /// Secret for manual entry
    pub secret: String,
    /// otpauth:// URL
    pub otpauth_url: String,
}

/// TOTP setup use case
pub struct TotpSetupUseCase<A, C>
where
    A: AccountRepository,
    C: CredentialsRepository,
{
    account_repo: Arc<A>,
    credentials_repo: Arc<C>,
}

impl<A, C> TotpSetupUseCase<A, C>
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

    /// Start enrollment: provision a new secret, not yet enforced.
    ///
    /// Re-running enrollment replaces an unverified secret.
    pub async fn setup(&self, account_id: &AccountId) -> AuthResult<TotpSetupOutput> {
        let account = self
            .account_repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let mut credentials = self
            .credentials_repo
            .find_by_account_id(account_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        let secret = TotpSecret::generate();
        credentials.totp_secret = Some(secret.clone());
        credentials.totp_enabled = false;
        credentials.updated_at = Utc::now();
        self.credentials_repo.update(&credentials).await?;

        let label = account.email.as_str();

        let qr_code = secret
            .generate_qr_code(label)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let otpauth_url = secret
            .get_otpauth_url(label)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(public_id = %account.public_id, "MFA enrollment started");

        Ok(TotpSetupOutput {
            qr_code_base64: qr_code,
            secret: secret.as_base32().to_string(),
            otpauth_url,
        })
    }

    /// Verify a code and start enforcing MFA at login
    pub async fn verify(&self, account_id: &AccountId, code: &str) -> AuthResult<()> {
        let account = self
            .account_repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let mut credentials = self
            .credentials_repo
            .find_by_account_id(account_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        let secret = credentials
            .totp_secret
            .as_ref()
            .ok_or(AuthError::MfaNotSetup)?;

        let valid = secret
            .verify(code, account.email.as_str())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !valid {
            return Err(AuthError::InvalidMfaCode);
        }

        credentials.totp_enabled = true;
        credentials.updated_at = Utc::now();
        self.credentials_repo.update(&credentials).await?;

        tracing::info!(public_id = %account.public_id, "MFA enabled");

        Ok(())
    }

    /// Disable MFA. Requires a valid current code.
    pub async fn disable(&self, account_id: &AccountId, code: &str) -> AuthResult<()> {
        let account = self
            .account_repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let mut credentials = self
            .credentials_repo
            .find_by_account_id(account_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        let secret = credentials
            .totp_secret
            .as_ref()
            .ok_or(AuthError::MfaNotSetup)?;

        let valid = secret
            .verify(code, account.email.as_str())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !valid {
            return Err(AuthError::InvalidMfaCode);
        }

        credentials.totp_secret = None;
        credentials.totp_enabled = false;
        credentials.updated_at = Utc::now();
        self.credentials_repo.update(&credentials).await?;

        tracing::info!(public_id = %account.public_id, "MFA disabled");

        Ok(())
    }
}
