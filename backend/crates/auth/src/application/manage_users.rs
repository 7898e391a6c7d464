//! Account Management Use Cases
//!
//! Admin operations over the account list plus the self-service
//! profile operations. Role checks happen in the handlers via the
//! authorize policy, not here.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_id::AccountId, public_id::PublicId, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Admin account management use case
pub struct ManageUsersUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
}

impl<A> ManageUsersUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>) -> Self {
        Self { account_repo }
    }

    /// List all accounts
    pub async fn list(&self) -> AuthResult<Vec<Account>> {
        self.account_repo.list().await
    }

    /// Delete an account by its public ID
    pub async fn delete(&self, public_id: &PublicId) -> AuthResult<()> {
        let account = self
            .account_repo
            .find_by_public_id(public_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let deleted = self.account_repo.delete(&account.account_id).await?;
        if !deleted {
            return Err(AuthError::AccountNotFound);
        }

        tracing::info!(public_id = %public_id, "Account deleted");

        Ok(())
    }

    /// Change an account's role
    pub async fn set_role(&self, public_id: &PublicId, role: UserRole) -> AuthResult<Account> {
        let mut account = self
            .account_repo
            .find_by_public_id(public_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        account.user_role = role;
        account.updated_at = Utc::now();
        self.account_repo.update(&account).await?;

        tracing::info!(public_id = %public_id, role = %role, "Account role changed");

        Ok(account)
    }
}

/// Self-service profile use case
pub struct ProfileUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
}

impl<A> ProfileUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>) -> Self {
        Self { account_repo }
    }

    /// Fetch the caller's own account
    pub async fn get(&self, account_id: &AccountId) -> AuthResult<Account> {
        self.account_repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    /// Change the caller's display name
    pub async fn rename(&self, account_id: &AccountId, user_name: UserName) -> AuthResult<Account> {
        let mut account = self
            .account_repo
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        account.user_name = user_name;
        account.updated_at = Utc::now();
        self.account_repo.update(&account).await?;

        Ok(account)
    }
}
