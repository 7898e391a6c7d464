//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use nid::Nanoid;
use platform::rate_limit::{RateLimitConfig, RateLimitResult, RateLimitStore};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::entity::{account::Account, credentials::Credentials};
use crate::domain::repository::{AccountRepository, CredentialsRepository};
use crate::domain::value_object::{
    account_id::AccountId, email::Email, public_id::PublicId, totp_secret::TotpSecret,
    user_name::UserName, user_password::UserPassword, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

const ACCOUNT_COLUMNS: &str = r#"
    account_id,
    public_id,
    user_name,
    email,
    user_role,
    email_verified,
    last_login_at,
    created_at,
    updated_at
"#;

const CREDENTIALS_COLUMNS: &str = r#"
    account_id,
    password_hash,
    totp_secret,
    totp_enabled,
    login_failed_count,
    last_failed_at,
    locked_until,
    refresh_token_hash,
    reset_token_hash,
    reset_token_expires_at,
    verify_token_hash,
    verify_token_expires_at,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Remove rate-limit windows that ended more than a day ago
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let cutoff_ms = (Utc::now() - chrono::Duration::days(1)).timestamp_millis();

        let deleted = sqlx::query("DELETE FROM login_rate_limits WHERE window_start_ms < $1")
            .bind(cutoff_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(windows_deleted = deleted, "Cleaned up stale rate limit windows");

        Ok(deleted)
    }
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgAuthRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                public_id,
                user_name,
                email,
                user_role,
                email_verified,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.public_id.as_str())
        .bind(account.user_name.as_str())
        .bind(account.email.as_str())
        .bind(account.user_role.id())
        .bind(account.email_verified)
        .bind(account.last_login_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = $1"
        ))
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE public_id = $1"
        ))
        .bind(public_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list(&self) -> AuthResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_account()).collect()
    }

    async fn update(&self, account: &Account) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts SET
                user_name = $2,
                email = $3,
                user_role = $4,
                email_verified = $5,
                last_login_at = $6,
                updated_at = $7
            WHERE account_id = $1
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.user_name.as_str())
        .bind(account.email.as_str())
        .bind(account.user_role.id())
        .bind(account.email_verified)
        .bind(account.last_login_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, account_id: &AccountId) -> AuthResult<bool> {
        // Credentials row goes with it via ON DELETE CASCADE
        let affected = sqlx::query("DELETE FROM accounts WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}

// ============================================================================
// Credentials Repository Implementation
// ============================================================================

impl CredentialsRepository for PgAuthRepository {
    async fn create(&self, credentials: &Credentials) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO credentials (
                account_id,
                password_hash,
                totp_secret,
                totp_enabled,
                login_failed_count,
                last_failed_at,
                locked_until,
                refresh_token_hash,
                reset_token_hash,
                reset_token_expires_at,
                verify_token_hash,
                verify_token_expires_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(credentials.account_id.as_uuid())
        .bind(credentials.password_hash.as_phc_string())
        .bind(credentials.totp_secret.as_ref().map(|s| s.as_base32()))
        .bind(credentials.totp_enabled)
        .bind(credentials.login_failed_count as i16)
        .bind(credentials.last_failed_at)
        .bind(credentials.locked_until)
        .bind(credentials.refresh_token_hash.as_deref())
        .bind(credentials.reset_token_hash.as_deref())
        .bind(credentials.reset_token_expires_at)
        .bind(credentials.verify_token_hash.as_deref())
        .bind(credentials.verify_token_expires_at)
        .bind(credentials.created_at)
        .bind(credentials.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_account_id(&self, account_id: &AccountId) -> AuthResult<Option<Credentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(&format!(
            "SELECT {CREDENTIALS_COLUMNS} FROM credentials WHERE account_id = $1"
        ))
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_credentials()).transpose()
    }

    async fn find_by_refresh_token_hash(&self, hash: &str) -> AuthResult<Option<Credentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(&format!(
            "SELECT {CREDENTIALS_COLUMNS} FROM credentials WHERE refresh_token_hash = $1"
        ))
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_credentials()).transpose()
    }

    async fn find_by_reset_token_hash(&self, hash: &str) -> AuthResult<Option<Credentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(&format!(
            "SELECT {CREDENTIALS_COLUMNS} FROM credentials WHERE reset_token_hash = $1"
        ))
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_credentials()).transpose()
    }

    async fn find_by_verify_token_hash(&self, hash: &str) -> AuthResult<Option<Credentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(&format!(
            "SELECT {CREDENTIALS_COLUMNS} FROM credentials WHERE verify_token_hash = $1"
        ))
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_credentials()).transpose()
    }

    async fn update(&self, credentials: &Credentials) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE credentials SET
                password_hash = $2,
                totp_secret = $3,
                totp_enabled = $4,
                login_failed_count = $5,
                last_failed_at = $6,
                locked_until = $7,
                refresh_token_hash = $8,
                reset_token_hash = $9,
                reset_token_expires_at = $10,
                verify_token_hash = $11,
                verify_token_expires_at = $12,
                updated_at = $13
            WHERE account_id = $1
            "#,
        )
        .bind(credentials.account_id.as_uuid())
        .bind(credentials.password_hash.as_phc_string())
        .bind(credentials.totp_secret.as_ref().map(|s| s.as_base32()))
        .bind(credentials.totp_enabled)
        .bind(credentials.login_failed_count as i16)
        .bind(credentials.last_failed_at)
        .bind(credentials.locked_until)
        .bind(credentials.refresh_token_hash.as_deref())
        .bind(credentials.reset_token_hash.as_deref())
        .bind(credentials.reset_token_expires_at)
        .bind(credentials.verify_token_hash.as_deref())
        .bind(credentials.verify_token_expires_at)
        .bind(credentials.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Rate Limit Store Implementation
// ============================================================================

impl RateLimitStore for PgAuthRepository {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>> {
        let now_ms = Utc::now().timestamp_millis();
        let window_ms = config.window_ms();
        let window_start = now_ms - now_ms % window_ms;

        let count: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO login_rate_limits (client_key, window_start_ms, request_count)
            VALUES ($1, $2, 1)
            ON CONFLICT (client_key, window_start_ms)
            DO UPDATE SET request_count = login_rate_limits.request_count + 1
            RETURNING request_count
            "#,
        )
        .bind(key)
        .bind(window_start)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?;

        let count = count as u32;

        Ok(RateLimitResult {
            allowed: count <= config.max_requests,
            remaining: config.max_requests.saturating_sub(count),
            reset_at_ms: window_start + window_ms,
        })
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    public_id: String,
    user_name: String,
    email: String,
    user_role: i16,
    email_verified: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let public_id = PublicId::from_nanoid(
            Nanoid::from_str(&self.public_id)
                .map_err(|e| AuthError::Internal(format!("Invalid public_id: {}", e)))?,
        );

        let user_name = UserName::from_db(self.user_name)
            .map_err(|e| AuthError::Internal(format!("Invalid user_name: {}", e)))?;

        let user_role = UserRole::from_id(self.user_role)
            .map_err(|e| AuthError::Internal(format!("Invalid user_role: {}", e)))?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            public_id,
            user_name,
            email: Email::from_db(self.email),
            user_role,
            email_verified: self.email_verified,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    account_id: Uuid,
    password_hash: String,
    totp_secret: Option<String>,
    totp_enabled: bool,
    login_failed_count: i16,
    last_failed_at: Option<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
    refresh_token_hash: Option<String>,
    reset_token_hash: Option<String>,
    reset_token_expires_at: Option<DateTime<Utc>>,
    verify_token_hash: Option<String>,
    verify_token_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CredentialsRow {
    fn into_credentials(self) -> AuthResult<Credentials> {
        let password_hash = UserPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        let totp_secret = self
            .totp_secret
            .map(TotpSecret::from_base32)
            .transpose()
            .map_err(|e| AuthError::Internal(format!("Invalid TOTP secret: {}", e)))?;

        Ok(Credentials {
            account_id: AccountId::from_uuid(self.account_id),
            password_hash,
            totp_secret,
            totp_enabled: self.totp_enabled,
            login_failed_count: self.login_failed_count as u16,
            last_failed_at: self.last_failed_at,
            locked_until: self.locked_until,
            refresh_token_hash: self.refresh_token_hash,
            reset_token_hash: self.reset_token_hash,
            reset_token_expires_at: self.reset_token_expires_at,
            verify_token_hash: self.verify_token_hash,
            verify_token_expires_at: self.verify_token_expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
