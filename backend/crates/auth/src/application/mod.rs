//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod mailer;
pub mod manage_users;
pub mod password_reset;
pub mod refresh;
pub mod register;
pub mod sign_in;
pub mod sign_out;
pub mod totp_setup;
pub mod verify_email;

// Re-exports
pub use config::AuthConfig;
pub use mailer::Mailer;
pub use manage_users::{ManageUsersUseCase, ProfileUseCase};
pub use password_reset::{
    RESET_REQUEST_MESSAGE, RequestPasswordResetUseCase, ResetPasswordUseCase,
};
pub use refresh::{RefreshOutput, RefreshUseCase};
pub use register::{REGISTER_MESSAGE, RegisterInput, RegisterOutput, RegisterUseCase};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use totp_setup::{TotpSetupOutput, TotpSetupUseCase};
pub use verify_email::VerifyEmailUseCase;
