//! SMTP Mailer Implementation
//!
//! Async SMTP transport behind the `Mailer` port. When no host is
//! configured the mailer degrades to a logging no-op so local
//! development does not need a mail server.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::application::mailer::Mailer;
use crate::error::{AuthError, AuthResult};

/// SMTP connection settings
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// Relay host; None disables outbound mail
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address, e.g. "Gatehouse <no-reply@example.com>"
    pub from: String,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: 587,
            username: None,
            password: None,
            from: "no-reply@localhost".to_string(),
        }
    }
}

impl SmtpSettings {
    /// Read settings from SMTP_* environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("SMTP_HOST").ok(),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            username: std::env::var("SMTP_USERNAME").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
            from: std::env::var("SMTP_FROM").unwrap_or(defaults.from),
        }
    }
}

/// SMTP-backed mailer
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> AuthResult<Self> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e| AuthError::Internal(format!("Invalid sender address: {}", e)))?;

        let transport = match settings.host {
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
                    .map_err(|e| AuthError::Internal(format!("Invalid SMTP relay: {}", e)))?
                    .port(settings.port);

                if let (Some(username), Some(password)) = (settings.username, settings.password) {
                    builder = builder.credentials(SmtpCredentials::new(username, password));
                }

                Some(builder.build())
            }
            None => {
                tracing::warn!("SMTP host not configured, outbound mail disabled");
                None
            }
        };

        Ok(Self { transport, from })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AuthResult<()> {
        let Some(transport) = &self.transport else {
            tracing::info!(to = %to, subject = %subject, "Mail transport disabled, skipping send");
            return Ok(());
        };

        let message = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|e| AuthError::Validation(format!("Invalid recipient address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| AuthError::Internal(format!("Failed to build mail: {}", e)))?;

        transport
            .send(message)
            .await
            .map_err(|e| AuthError::Internal(format!("Failed to send mail: {}", e)))?;

        tracing::debug!(to = %to, subject = %subject, "Mail sent");

        Ok(())
    }
}
