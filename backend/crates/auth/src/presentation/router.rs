//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use platform::rate_limit::RateLimitStore;

use crate::application::config::AuthConfig;
use crate::application::mailer::Mailer;
use crate::domain::repository::{AccountRepository, CredentialsRepository};
use crate::infra::postgres::PgAuthRepository;
use crate::infra::smtp::SmtpMailer;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthTokenState, require_access_token};

/// Create the Auth router with PostgreSQL repository and SMTP mailer
pub fn auth_router(repo: PgAuthRepository, mailer: SmtpMailer, config: AuthConfig) -> Router {
    auth_router_generic(repo, mailer, config)
}

/// Create the Users router with PostgreSQL repository and SMTP mailer
pub fn users_router(repo: PgAuthRepository, mailer: SmtpMailer, config: AuthConfig) -> Router {
    users_router_generic(repo, mailer, config)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R, M>(repo: R, mailer: M, config: AuthConfig) -> Router
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let config = Arc::new(config);
    let state = AuthAppState {
        repo: Arc::new(repo),
        mailer: Arc::new(mailer),
        config: config.clone(),
    };
    let token_state = AuthTokenState { config };

    let protected = Router::new()
        .route("/mfa/enable", post(handlers::mfa_enable::<R, M>))
        .route("/mfa/verify", post(handlers::mfa_verify::<R, M>))
        .route("/mfa/disable", post(handlers::mfa_disable::<R, M>))
        .layer(axum::middleware::from_fn(
            move |req: axum::extract::Request, next: axum::middleware::Next| {
                let token_state = token_state.clone();
                async move { require_access_token(token_state, req, next).await }
            },
        ));

    Router::new()
        .route("/register", post(handlers::register::<R, M>))
        .route("/login", post(handlers::login::<R, M>))
        .route("/refresh-token", post(handlers::refresh::<R, M>))
        .route("/logout", post(handlers::logout::<R, M>))
        .route("/verify-email", post(handlers::verify_email::<R, M>))
        .route(
            "/request-password-reset",
            post(handlers::request_password_reset::<R, M>),
        )
        .route("/reset-password", post(handlers::reset_password::<R, M>))
        .merge(protected)
        .with_state(state)
}

/// Create a generic Users router for any repository implementation
pub fn users_router_generic<R, M>(repo: R, mailer: M, config: AuthConfig) -> Router
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let config = Arc::new(config);
    let state = AuthAppState {
        repo: Arc::new(repo),
        mailer: Arc::new(mailer),
        config: config.clone(),
    };
    let token_state = AuthTokenState { config };

    Router::new()
        .route(
            "/me",
            get(handlers::me::<R, M>).patch(handlers::update_me::<R, M>),
        )
        .route("/users", get(handlers::list_accounts::<R, M>))
        .route(
            "/users/{id}",
            axum::routing::delete(handlers::delete_account::<R, M>),
        )
        .route(
            "/users/{id}/role",
            axum::routing::patch(handlers::update_role::<R, M>),
        )
        .layer(axum::middleware::from_fn(
            move |req: axum::extract::Request, next: axum::middleware::Next| {
                let token_state = token_state.clone();
                async move { require_access_token(token_state, req, next).await }
            },
        ))
        .with_state(state)
}
