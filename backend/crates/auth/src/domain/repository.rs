//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::{account::Account, credentials::Credentials};
use crate::domain::value_object::{account_id::AccountId, email::Email, public_id::PublicId};
use crate::error::AuthResult;

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Create a new account
    async fn create(&self, account: &Account) -> AuthResult<()>;

    /// Find account by internal ID
    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    /// Find account by public ID
    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<Account>>;

    /// Find account by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    /// Check if an email is already registered
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// List all accounts (admin operation)
    async fn list(&self) -> AuthResult<Vec<Account>>;

    /// Update account
    async fn update(&self, account: &Account) -> AuthResult<()>;

    /// Delete account and its credentials. Returns false if absent.
    async fn delete(&self, account_id: &AccountId) -> AuthResult<bool>;
}

/// Credentials repository trait
#[trait_variant::make(CredentialsRepository: Send)]
pub trait LocalCredentialsRepository {
    /// Create credentials
    async fn create(&self, credentials: &Credentials) -> AuthResult<()>;

    /// Find credentials by account ID
    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<Credentials>>;

    /// Find credentials holding this refresh token digest
    async fn find_by_refresh_token_hash(&self, hash: &str) -> AuthResult<Option<Credentials>>;

    /// Find credentials holding this reset token digest
    async fn find_by_reset_token_hash(&self, hash: &str) -> AuthResult<Option<Credentials>>;

    /// Find credentials holding this email verification token digest
    async fn find_by_verify_token_hash(&self, hash: &str) -> AuthResult<Option<Credentials>>;

    /// Update credentials
    async fn update(&self, credentials: &Credentials) -> AuthResult<()>;
}
