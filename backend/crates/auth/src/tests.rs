//! Use case integration tests against in-memory stores.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use platform::crypto::sha256_hex;

use crate::application::config::AuthConfig;
use crate::application::mailer::Mailer;
use crate::application::{
    ManageUsersUseCase, ProfileUseCase, RESET_REQUEST_MESSAGE, REGISTER_MESSAGE, RefreshUseCase,
    RegisterInput, RegisterUseCase, RequestPasswordResetUseCase, ResetPasswordUseCase, SignInInput,
    SignInOutput, SignInUseCase, SignOutUseCase, TotpSetupUseCase, VerifyEmailUseCase,
};
use crate::domain::entity::{account::Account, credentials::Credentials};
use crate::domain::repository::{AccountRepository, CredentialsRepository};
use crate::domain::value_object::{
    account_id::AccountId, email::Email, public_id::PublicId, user_name::UserName,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// In-memory store backing both repository traits
#[derive(Clone, Default)]
struct MemStore {
    accounts: Arc<Mutex<Vec<Account>>>,
    credentials: Arc<Mutex<Vec<Credentials>>>,
}

impl AccountRepository for MemStore {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        self.accounts.lock().unwrap().push(account.clone());
        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.account_id == *account_id)
            .cloned())
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.public_id == *public_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == *email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.email == *email))
    }

    async fn list(&self) -> AuthResult<Vec<Account>> {
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn update(&self, account: &Account) -> AuthResult<()> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(slot) = accounts
            .iter_mut()
            .find(|a| a.account_id == account.account_id)
        {
            *slot = account.clone();
        }
        Ok(())
    }

    async fn delete(&self, account_id: &AccountId) -> AuthResult<bool> {
        let mut accounts = self.accounts.lock().unwrap();
        let before = accounts.len();
        accounts.retain(|a| a.account_id != *account_id);
        self.credentials
            .lock()
            .unwrap()
            .retain(|c| c.account_id != *account_id);
        Ok(accounts.len() < before)
    }
}

impl CredentialsRepository for MemStore {
    async fn create(&self, credentials: &Credentials) -> AuthResult<()> {
        self.credentials.lock().unwrap().push(credentials.clone());
        Ok(())
    }

    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<Credentials>> {
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.account_id == *account_id)
            .cloned())
    }

    async fn find_by_refresh_token_hash(&self, hash: &str) -> AuthResult<Option<Credentials>> {
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.refresh_token_hash.as_deref() == Some(hash))
            .cloned())
    }

    async fn find_by_reset_token_hash(&self, hash: &str) -> AuthResult<Option<Credentials>> {
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.reset_token_hash.as_deref() == Some(hash))
            .cloned())
    }

    async fn find_by_verify_token_hash(&self, hash: &str) -> AuthResult<Option<Credentials>> {
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.verify_token_hash.as_deref() == Some(hash))
            .cloned())
    }

    async fn update(&self, credentials: &Credentials) -> AuthResult<()> {
        let mut all = self.credentials.lock().unwrap();
        if let Some(slot) = all
            .iter_mut()
            .find(|c| c.account_id == credentials.account_id)
        {
            *slot = credentials.clone();
        }
        Ok(())
    }
}

/// Mailer capturing every message instead of sending
#[derive(Clone, Default)]
struct MemMailer {
    sent: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl Mailer for MemMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AuthResult<()> {
        self.sent.lock().unwrap().push((
            to.to_string(),
            subject.to_string(),
            html_body.to_string(),
        ));
        Ok(())
    }
}

impl MemMailer {
    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Pull the opaque token out of the link in the last captured mail
    fn last_token(&self) -> String {
        let sent = self.sent.lock().unwrap();
        let (_, _, body) = sent.last().expect("no mail captured");
        body.split("token=")
            .nth(1)
            .expect("mail body has no token link")
            .split('"')
            .next()
            .expect("unterminated link")
            .to_string()
    }
}

struct Harness {
    store: Arc<MemStore>,
    mailer: Arc<MemMailer>,
    config: Arc<AuthConfig>,
}

impl Harness {
    fn new() -> Self {
        Self {
            store: Arc::new(MemStore::default()),
            mailer: Arc::new(MemMailer::default()),
            config: Arc::new(AuthConfig::development()),
        }
    }

    async fn register(&self, user_name: &str, email: &str, password: &str) -> AuthResult<()> {
        let use_case = RegisterUseCase::new(
            self.store.clone(),
            self.store.clone(),
            self.mailer.clone(),
            self.config.clone(),
        );
        let output = use_case
            .execute(RegisterInput {
                user_name: user_name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        assert_eq!(output.message, REGISTER_MESSAGE);
        Ok(())
    }

    async fn verify_email(&self, token: &str) -> AuthResult<()> {
        VerifyEmailUseCase::new(self.store.clone(), self.store.clone())
            .execute(token)
            .await
    }

    /// Register and verify in one step
    async fn registered_account(&self, email: &str, password: &str) {
        self.register("Alice", email, password).await.unwrap();
        let token = self.mailer.last_token();
        self.verify_email(&token).await.unwrap();
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
        totp_code: Option<&str>,
    ) -> AuthResult<SignInOutput> {
        SignInUseCase::new(self.store.clone(), self.store.clone(), self.config.clone())
            .execute(SignInInput {
                email: email.to_string(),
                password: password.to_string(),
                totp_code: totp_code.map(str::to_string),
            })
            .await
    }

    fn account(&self, email: &str) -> Account {
        let email = Email::new(email).unwrap();
        self.store
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned()
            .expect("account not found")
    }

    fn credentials(&self, email: &str) -> Credentials {
        let account = self.account(email);
        self.store
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.account_id == account.account_id)
            .cloned()
            .expect("credentials not found")
    }
}

const EMAIL: &str = "alice@example.com";
const PASSWORD: &str = "correct horse battery staple";

#[tokio::test]
async fn test_register_is_enumeration_safe() {
    let h = Harness::new();

    h.register("Alice", EMAIL, PASSWORD).await.unwrap();
    // Same message for the duplicate, and no second account or mail
    h.register("Mallory", EMAIL, "another password 123")
        .await
        .unwrap();

    assert_eq!(h.store.accounts.lock().unwrap().len(), 1);
    assert_eq!(h.mailer.count(), 1);
}

#[tokio::test]
async fn test_login_requires_verified_email() {
    let h = Harness::new();
    h.register("Alice", EMAIL, PASSWORD).await.unwrap();

    let err = h.sign_in(EMAIL, PASSWORD, None).await.unwrap_err();
    assert!(matches!(err, AuthError::EmailNotVerified));
}

#[tokio::test]
async fn test_register_verify_login_flow() {
    let h = Harness::new();
    h.register("Alice", EMAIL, PASSWORD).await.unwrap();

    let token = h.mailer.last_token();
    h.verify_email(&token).await.unwrap();
    assert!(h.account(EMAIL).email_verified);

    // The verification token is single-use
    let err = h.verify_email(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenInvalid));

    let output = h.sign_in(EMAIL, PASSWORD, None).await.unwrap();
    assert!(!output.access_token.is_empty());
    assert_eq!(output.expires_in_secs, 15 * 60);

    // The refresh digest is persisted, never the token itself
    let creds = h.credentials(EMAIL);
    assert_eq!(
        creds.refresh_token_hash.as_deref(),
        Some(sha256_hex(output.refresh_token.as_bytes()).as_str())
    );
    assert!(h.account(EMAIL).last_login_at.is_some());
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_look_alike() {
    let h = Harness::new();
    h.registered_account(EMAIL, PASSWORD).await;

    let err = h.sign_in("nobody@example.com", PASSWORD, None).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = h.sign_in(EMAIL, "wrong password here", None).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_lockout_after_repeated_failures() {
    let h = Harness::new();
    h.registered_account(EMAIL, PASSWORD).await;

    for _ in 0..4 {
        let err = h.sign_in(EMAIL, "wrong password here", None).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    // The attempt that crosses the threshold already reports the lock
    let err = h.sign_in(EMAIL, "wrong password here", None).await.unwrap_err();
    assert!(matches!(err, AuthError::AccountLocked));

    // The correct password does not bypass an active lock
    let err = h.sign_in(EMAIL, PASSWORD, None).await.unwrap_err();
    assert!(matches!(err, AuthError::AccountLocked));

    // Once the lock expires a successful login clears the counter
    let mut creds = h.credentials(EMAIL);
    creds.locked_until = Some(Utc::now() - Duration::seconds(1));
    CredentialsRepository::update(h.store.as_ref(), &creds)
        .await
        .unwrap();

    h.sign_in(EMAIL, PASSWORD, None).await.unwrap();
    let creds = h.credentials(EMAIL);
    assert_eq!(creds.login_failed_count, 0);
    assert!(creds.locked_until.is_none());
}

#[tokio::test]
async fn test_refresh_and_logout() {
    let h = Harness::new();
    h.registered_account(EMAIL, PASSWORD).await;
    let login = h.sign_in(EMAIL, PASSWORD, None).await.unwrap();

    let refresh = RefreshUseCase::new(h.store.clone(), h.store.clone(), h.config.clone());

    let output = refresh.execute(&login.refresh_token).await.unwrap();
    assert!(!output.access_token.is_empty());

    // A forged or tampered token never reaches the store lookup
    let err = refresh.execute("not-a-jwt").await.unwrap_err();
    assert!(matches!(err, AuthError::TokenInvalid));

    // Logout revokes the digest, so the token stops refreshing
    let sign_out = SignOutUseCase::new(h.store.clone());
    sign_out.execute(&login.refresh_token).await.unwrap();

    let err = refresh.execute(&login.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenInvalid));

    // Logout of an already revoked token is a no-op
    sign_out.execute(&login.refresh_token).await.unwrap();
}

#[tokio::test]
async fn test_password_reset_flow() {
    let h = Harness::new();
    h.registered_account(EMAIL, PASSWORD).await;
    let login = h.sign_in(EMAIL, PASSWORD, None).await.unwrap();

    // Lock the account to show the reset clears it
    for _ in 0..5 {
        let _ = h.sign_in(EMAIL, "wrong password here", None).await;
    }

    let request = RequestPasswordResetUseCase::new(
        h.store.clone(),
        h.store.clone(),
        h.mailer.clone(),
        h.config.clone(),
    );

    let mails_before = h.mailer.count();
    let message = request.execute(EMAIL.to_string()).await.unwrap();
    assert_eq!(message, RESET_REQUEST_MESSAGE);
    assert_eq!(h.mailer.count(), mails_before + 1);

    // Unknown addresses get the identical answer and no mail
    let message = request
        .execute("nobody@example.com".to_string())
        .await
        .unwrap();
    assert_eq!(message, RESET_REQUEST_MESSAGE);
    assert_eq!(h.mailer.count(), mails_before + 1);

    let token = h.mailer.last_token();
    let new_password = "an entirely new passphrase";

    let reset = ResetPasswordUseCase::new(h.store.clone(), h.config.clone());
    reset.execute(&token, new_password.to_string()).await.unwrap();

    // The reset token is single-use
    let err = reset
        .execute(&token, "yet another password".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::TokenInvalid));

    // Old password is gone, lockout is cleared, new password works
    let err = h.sign_in(EMAIL, PASSWORD, None).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    h.sign_in(EMAIL, new_password, None).await.unwrap();

    // Outstanding refresh tokens were revoked by the reset
    let refresh = RefreshUseCase::new(h.store.clone(), h.store.clone(), h.config.clone());
    let err = refresh.execute(&login.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenInvalid));
}

#[tokio::test]
async fn test_mfa_enrollment_and_login() {
    let h = Harness::new();
    h.registered_account(EMAIL, PASSWORD).await;
    let account_id = h.account(EMAIL).account_id;

    let totp = TotpSetupUseCase::new(h.store.clone(), h.store.clone());
    let setup = totp.setup(&account_id).await.unwrap();
    assert!(!setup.secret.is_empty());
    assert!(setup.otpauth_url.starts_with("otpauth://totp/"));

    // Enrollment is pending until a code is verified
    assert!(!h.credentials(EMAIL).totp_enabled);
    h.sign_in(EMAIL, PASSWORD, None).await.unwrap();

    let secret = h.credentials(EMAIL).totp_secret.unwrap();
    let code = secret.generate_current(EMAIL).unwrap();
    totp.verify(&account_id, &code).await.unwrap();
    assert!(h.credentials(EMAIL).totp_enabled);

    // Password alone is no longer enough
    let err = h.sign_in(EMAIL, PASSWORD, None).await.unwrap_err();
    assert!(matches!(err, AuthError::MfaRequired));

    let err = h.sign_in(EMAIL, PASSWORD, Some("000000")).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidMfaCode));

    let code = secret.generate_current(EMAIL).unwrap();
    h.sign_in(EMAIL, PASSWORD, Some(&code)).await.unwrap();

    // Disabling requires a valid code and restores password-only login
    let err = totp.disable(&account_id, "000000").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidMfaCode));

    let code = secret.generate_current(EMAIL).unwrap();
    totp.disable(&account_id, &code).await.unwrap();
    assert!(h.credentials(EMAIL).totp_secret.is_none());
    h.sign_in(EMAIL, PASSWORD, None).await.unwrap();
}

#[tokio::test]
async fn test_mfa_verify_without_setup() {
    let h = Harness::new();
    h.registered_account(EMAIL, PASSWORD).await;
    let account_id = h.account(EMAIL).account_id;

    let totp = TotpSetupUseCase::new(h.store.clone(), h.store.clone());
    let err = totp.verify(&account_id, "123456").await.unwrap_err();
    assert!(matches!(err, AuthError::MfaNotSetup));
}

#[tokio::test]
async fn test_manage_accounts() {
    let h = Harness::new();
    h.registered_account(EMAIL, PASSWORD).await;
    h.register("Bob", "bob@example.com", PASSWORD).await.unwrap();

    let manage = ManageUsersUseCase::new(h.store.clone());

    let accounts = manage.list().await.unwrap();
    assert_eq!(accounts.len(), 2);

    let bob = h.account("bob@example.com");
    let updated = manage
        .set_role(&bob.public_id, UserRole::Admin)
        .await
        .unwrap();
    assert_eq!(updated.user_role, UserRole::Admin);

    manage.delete(&bob.public_id).await.unwrap();
    assert_eq!(manage.list().await.unwrap().len(), 1);

    // Deleting an absent account is a not-found error
    let err = manage.delete(&bob.public_id).await.unwrap_err();
    assert!(matches!(err, AuthError::AccountNotFound));
}

#[tokio::test]
async fn test_profile_rename() {
    let h = Harness::new();
    h.registered_account(EMAIL, PASSWORD).await;
    let account_id = h.account(EMAIL).account_id;

    let profile = ProfileUseCase::new(h.store.clone());

    let account = profile.get(&account_id).await.unwrap();
    assert_eq!(account.user_name.as_str(), "Alice");

    let renamed = profile
        .rename(&account_id, UserName::new("Alice Cooper").unwrap())
        .await
        .unwrap();
    assert_eq!(renamed.user_name.as_str(), "Alice Cooper");
}
