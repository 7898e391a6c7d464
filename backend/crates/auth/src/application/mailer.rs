//! Mailer Port
//!
//! Outbound mail interface plus the message templates used by the
//! registration and password reset flows. The SMTP implementation is in
//! the infrastructure layer.

use crate::error::AuthResult;

/// Outbound mail trait
#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    /// Send an HTML mail to a single recipient
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AuthResult<()>;
}

/// Build the email verification message. Returns (subject, html body).
pub fn verification_mail(frontend_url: &str, token: &str) -> (String, String) {
    let link = format!("{}/verify-email?token={}", frontend_url, token);
    let subject = "Verify your email address".to_string();
    let body = format!(
        "<p>Welcome! Please <a href=\"{}\">verify your email address</a> \
         to activate your account.</p>\
         <p>This link is valid for 24 hours.</p>",
        link
    );
    (subject, body)
}

/// Build the password reset message. Returns (subject, html body).
pub fn password_reset_mail(frontend_url: &str, token: &str) -> (String, String) {
    let link = format!("{}/reset-password?token={}", frontend_url, token);
    let subject = "Password reset request".to_string();
    let body = format!(
        "<p>A password reset was requested for your account. \
         <a href=\"{}\">Choose a new password</a>.</p>\
         <p>This link is valid for 1 hour. If you did not request a reset, \
         you can ignore this mail.</p>",
        link
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mails_carry_the_token() {
        let (_, body) = verification_mail("https://app.example.com", "tok123");
        assert!(body.contains("https://app.example.com/verify-email?token=tok123"));

        let (_, body) = password_reset_mail("https://app.example.com", "tok456");
        assert!(body.contains("https://app.example.com/reset-password?token=tok456"));
    }
}
