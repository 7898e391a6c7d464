//! Register Use Case
//!
//! Creates an account with unverified email and sends the verification
//! mail. The response is identical whether or not the email was already
//! registered, so registration cannot be used to enumerate accounts.

use std::sync::Arc;

use chrono::Utc;
use platform::crypto::{generate_opaque_token, sha256_hex};

use crate::application::config::AuthConfig;
use crate::application::mailer::{Mailer, verification_mail};
use crate::domain::entity::{account::Account, credentials::Credentials};
use crate::domain::repository::{AccountRepository, CredentialsRepository};
use crate::domain::value_object::{
    email::Email, user_name::UserName, user_password::{RawPassword, UserPassword},
};
use crate::error::AuthResult;

/// Returned for both the fresh and the already-registered case
pub const REGISTER_MESSAGE: &str =
    "Registration successful. Please check your email to verify your account.";

/// Register input
pub struct RegisterInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// Register output
pub struct RegisterOutput {
    pub message: &'static str,
}

/// Register use case
pub struct RegisterUseCase<A, C, M>
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

impl<A, C, M> RegisterUseCase<A, C, M>
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

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let user_name = UserName::new(&input.user_name)?;
        let email = Email::new(&input.email)?;
        let raw_password = RawPassword::new(input.password)?;

        // Indistinguishable from success, the existing account is untouched
        if self.account_repo.exists_by_email(&email).await? {
            tracing::info!("Registration attempt for an already registered email");
            return Ok(RegisterOutput {
                message: REGISTER_MESSAGE,
            });
        }

        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let account = Account::new(user_name, email);
        let mut credentials = Credentials::new(account.account_id, password_hash);

        // Single-use verification token; only its digest is stored
        let verify_token = generate_opaque_token();
        credentials.verify_token_hash = Some(sha256_hex(verify_token.as_bytes()));
        credentials.verify_token_expires_at = Some(Utc::now() + self.config.verify_ttl());

        self.account_repo.create(&account).await?;
        self.credentials_repo.create(&credentials).await?;

        let (subject, body) = verification_mail(&self.config.frontend_url, &verify_token);
        if let Err(e) = self
            .mailer
            .send(account.email.as_str(), &subject, &body)
            .await
        {
            // The account exists; the token can be re-requested later
            tracing::warn!(error = %e, "Failed to send verification mail");
        }

        tracing::info!(public_id = %account.public_id, "Account registered");

        Ok(RegisterOutput {
            message: REGISTER_MESSAGE,
        })
    }
}
