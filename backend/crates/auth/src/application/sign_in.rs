//! Sign In Use Case
//!
//! Authenticates an account and issues the access/refresh token pair.
//!
//! Checks run in a fixed order so earlier gates cannot be probed through
//! later ones: lookup, email verified, lockout, password, MFA, issuance.
//! A failed password attempt is counted even when the supplied password
//! would not pass validation.

use std::sync::Arc;

use chrono::Utc;
use platform::crypto::sha256_hex;

use crate::application::config::AuthConfig;
use crate::domain::policy::lockout;
use crate::domain::repository::{AccountRepository, CredentialsRepository};
use crate::domain::token;
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
    /// TOTP code, required when MFA is enabled
    pub totp_code: Option<String>,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in_secs: u64,
    pub public_id: String,
}

/// Sign in use case
pub struct SignInUseCase<A, C>
where
    A: AccountRepository,
    C: CredentialsRepository,
{
    account_repo: Arc<A>,
    credentials_repo: Arc<C>,
    config: Arc<AuthConfig>,
}

impl<A, C> SignInUseCase<A, C>
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

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let mut account = self
            .account_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !account.email_verified {
            return Err(AuthError::EmailNotVerified);
        }

        let mut credentials = self
            .credentials_repo
            .find_by_account_id(&account.account_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        if lockout::is_locked(&credentials) {
            return Err(AuthError::AccountLocked);
        }

        // A password that fails validation counts as a wrong password
        let password_valid = match RawPassword::new(input.password) {
            Ok(raw) => credentials.password_hash.verify(&raw, self.config.pepper()),
            Err(_) => false,
        };

        if !password_valid {
            lockout::record_failure(&mut credentials);
            self.credentials_repo.update(&credentials).await?;

            // The attempt that crosses the threshold reports the lock
            if lockout::is_locked(&credentials) {
                return Err(AuthError::AccountLocked);
            }
            return Err(AuthError::InvalidCredentials);
        }

        if credentials.totp_enabled {
            let code = input.totp_code.as_deref().ok_or(AuthError::MfaRequired)?;

            let secret = credentials
                .totp_secret
                .as_ref()
                .ok_or_else(|| AuthError::Internal("TOTP enabled without secret".to_string()))?;

            let valid = secret
                .verify(code, account.email.as_str())
                .map_err(|e| AuthError::Internal(e.to_string()))?;

            if !valid {
                return Err(AuthError::InvalidMfaCode);
            }
        }

        // Fully authenticated: issue tokens and persist the refresh digest
        let keys = self.config.token_keys();
        let access_token = token::mint_access(
            &keys,
            &account.account_id,
            account.user_role,
            self.config.access_ttl(),
        )?;
        let refresh_token =
            token::mint_refresh(&keys, &account.account_id, self.config.refresh_ttl())?;

        lockout::reset(&mut credentials);
        credentials.refresh_token_hash = Some(sha256_hex(refresh_token.as_bytes()));
        credentials.updated_at = Utc::now();
        self.credentials_repo.update(&credentials).await?;

        let now = Utc::now();
        account.last_login_at = Some(now);
        account.updated_at = now;
        self.account_repo.update(&account).await?;

        tracing::info!(public_id = %account.public_id, "Account signed in");

        Ok(SignInOutput {
            access_token,
            refresh_token,
            expires_in_secs: self.config.access_token_ttl.as_secs(),
            public_id: account.public_id.to_string(),
        })
    }
}
