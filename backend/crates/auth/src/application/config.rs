//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::rate_limit::RateLimitConfig;

use crate::domain::token::TokenKeys;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 secret for signing both token kinds (32 bytes)
    pub jwt_secret: Vec<u8>,
    /// Access token lifetime (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (7 days)
    pub refresh_token_ttl: Duration,
    /// Email verification token lifetime (24 hours)
    pub verify_token_ttl: Duration,
    /// Password reset token lifetime (1 hour)
    pub reset_token_ttl: Duration,
    /// Cookie carrying the refresh token, scoped to the auth routes
    pub refresh_cookie: CookieConfig,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Per-client sliding window for login and reset requests
    pub login_rate_limit: RateLimitConfig,
    /// Base URL used in verification and reset links
    pub frontend_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let refresh_token_ttl = Duration::from_secs(7 * 24 * 3600);

        Self {
            jwt_secret: vec![0u8; 32],
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl,
            verify_token_ttl: Duration::from_secs(24 * 3600),
            reset_token_ttl: Duration::from_secs(3600),
            refresh_cookie: CookieConfig {
                max_age_secs: Some(refresh_token_ttl.as_secs() as i64),
                ..CookieConfig::default()
            },
            password_pepper: None,
            login_rate_limit: RateLimitConfig::default(),
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create config with a random JWT secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = vec![0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            jwt_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        let mut config = Self::with_random_secret();
        config.refresh_cookie.secure = false;
        config
    }

    /// Build token keys from the configured secret
    pub fn token_keys(&self) -> TokenKeys {
        TokenKeys::from_secret(&self.jwt_secret)
    }

    /// Access token TTL as chrono duration (for claim arithmetic)
    pub fn access_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_ttl.as_secs() as i64)
    }

    /// Refresh token TTL as chrono duration
    pub fn refresh_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.refresh_token_ttl.as_secs() as i64)
    }

    /// Verification token TTL as chrono duration
    pub fn verify_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.verify_token_ttl.as_secs() as i64)
    }

    /// Reset token TTL as chrono duration
    pub fn reset_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.reset_token_ttl.as_secs() as i64)
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
