//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use platform::client::{client_key, extract_client_ip};
use platform::cookie::extract_cookie;
use platform::rate_limit::RateLimitStore;

use crate::application::config::AuthConfig;
use crate::application::mailer::Mailer;
use crate::application::{
    ManageUsersUseCase, ProfileUseCase, RefreshUseCase, RegisterInput, RegisterUseCase,
    RequestPasswordResetUseCase, ResetPasswordUseCase, SignInInput, SignInUseCase, SignOutUseCase,
    TotpSetupUseCase, VerifyEmailUseCase,
};
use crate::domain::policy::authorize;
use crate::domain::repository::{AccountRepository, CredentialsRepository};
use crate::domain::value_object::{
    public_id::PublicId, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccountResponse, ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse,
    MfaDisableRequest, MfaSetupResponse, MfaVerifyRequest, RefreshResponse, RegisterRequest,
    ResetPasswordRequest, UpdateProfileRequest, UpdateRoleRequest, VerifyEmailRequest,
};
use crate::presentation::middleware::AuthContext;

/// Shared state for auth handlers
pub struct AuthAppState<R, M>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub config: Arc<AuthConfig>,
}

impl<R, M> Clone for AuthAppState<R, M>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            mailer: Arc::clone(&self.mailer),
            config: Arc::clone(&self.config),
        }
    }
}

/// Apply the per-client sliding window for credential-guessing surfaces
async fn enforce_rate_limit<R>(
    state_repo: &R,
    config: &AuthConfig,
    headers: &HeaderMap,
    addr: std::net::SocketAddr,
) -> AuthResult<()>
where
    R: RateLimitStore + Sync,
{
    let client_ip = extract_client_ip(headers, Some(addr.ip()));
    let key = client_key(client_ip);

    let result = state_repo
        .check_and_increment(&key, &config.login_rate_limit)
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    if !result.allowed {
        return Err(AuthError::RateLimited);
    }

    Ok(())
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(RegisterInput {
            user_name: req.user_name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(output.message)),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    // The window counts attempts, not successes, and is independent of
    // the per-account lockout
    enforce_rate_limit(state.repo.as_ref(), &state.config, &headers, addr).await?;

    let use_case = SignInUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
            totp_code: req.totp_code,
        })
        .await?;

    let cookie = state.config.refresh_cookie.build_set_cookie(&output.refresh_token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            access_token: output.access_token,
            token_type: "Bearer",
            expires_in: output.expires_in_secs,
            public_id: output.public_id,
        }),
    ))
}

// ============================================================================
// Refresh / Logout
// ============================================================================

/// POST /api/auth/refresh-token
pub async fn refresh<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> AuthResult<Json<RefreshResponse>>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.refresh_cookie.name)
        .ok_or(AuthError::TokenInvalid)?;

    let use_case =
        RefreshUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let output = use_case.execute(&token).await?;

    Ok(Json(RefreshResponse {
        access_token: output.access_token,
        token_type: "Bearer",
        expires_in: output.expires_in_secs,
    }))
}

/// POST /api/auth/logout
pub async fn logout<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    if let Some(token) = extract_cookie(&headers, &state.config.refresh_cookie.name) {
        let use_case = SignOutUseCase::new(state.repo.clone());
        use_case.execute(&token).await?;
    }

    let cookie = state.config.refresh_cookie.build_delete_cookie();

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// Email Verification
// ============================================================================

/// POST /api/auth/verify-email
pub async fn verify_email<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<VerifyEmailRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = VerifyEmailUseCase::new(state.repo.clone(), state.repo.clone());
    use_case.execute(&req.token).await?;

    Ok(Json(MessageResponse::new(
        "Email verified. You can now log in.",
    )))
}

// ============================================================================
// Password Reset
// ============================================================================

/// POST /api/auth/request-password-reset
pub async fn request_password_reset<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    enforce_rate_limit(state.repo.as_ref(), &state.config, &headers, addr).await?;

    let use_case = RequestPasswordResetUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let message = use_case.execute(req.email).await?;

    Ok(Json(MessageResponse::new(message)))
}

/// POST /api/auth/reset-password
pub async fn reset_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ResetPasswordUseCase::new(state.repo.clone(), state.config.clone());
    use_case.execute(&req.token, req.password).await?;

    Ok(Json(MessageResponse::new(
        "Password reset. You can now log in with your new password.",
    )))
}

// ============================================================================
// MFA (requires authentication)
// ============================================================================

/// POST /api/auth/mfa/enable
pub async fn mfa_enable<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(ctx): Extension<AuthContext>,
) -> AuthResult<Json<MfaSetupResponse>>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = TotpSetupUseCase::new(state.repo.clone(), state.repo.clone());
    let output = use_case.setup(&ctx.account_id).await?;

    Ok(Json(MfaSetupResponse {
        qr_code: output.qr_code_base64,
        secret: output.secret,
        otpauth_url: output.otpauth_url,
    }))
}

/// POST /api/auth/mfa/verify
pub async fn mfa_verify<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<MfaVerifyRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = TotpSetupUseCase::new(state.repo.clone(), state.repo.clone());
    use_case.verify(&ctx.account_id, &req.code).await?;

    Ok(Json(MessageResponse::new(
        "Multi-factor authentication enabled.",
    )))
}

/// POST /api/auth/mfa/disable
pub async fn mfa_disable<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<MfaDisableRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = TotpSetupUseCase::new(state.repo.clone(), state.repo.clone());
    use_case.disable(&ctx.account_id, &req.code).await?;

    Ok(Json(MessageResponse::new(
        "Multi-factor authentication disabled.",
    )))
}

// ============================================================================
// Accounts (requires authentication)
// ============================================================================

/// GET /api/me
pub async fn me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(ctx): Extension<AuthContext>,
) -> AuthResult<Json<AccountResponse>>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ProfileUseCase::new(state.repo.clone());
    let account = use_case.get(&ctx.account_id).await?;

    Ok(Json(AccountResponse::from_account(&account)))
}

/// PATCH /api/me
pub async fn update_me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> AuthResult<Json<AccountResponse>>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let user_name = UserName::new(&req.user_name)?;

    let use_case = ProfileUseCase::new(state.repo.clone());
    let account = use_case.rename(&ctx.account_id, user_name).await?;

    Ok(Json(AccountResponse::from_account(&account)))
}

/// GET /api/users (admin)
pub async fn list_accounts<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(ctx): Extension<AuthContext>,
) -> AuthResult<Json<Vec<AccountResponse>>>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    authorize::require(ctx.role, &[UserRole::Admin])?;

    let use_case = ManageUsersUseCase::new(state.repo.clone());
    let accounts = use_case.list().await?;

    Ok(Json(
        accounts.iter().map(AccountResponse::from_account).collect(),
    ))
}

/// DELETE /api/users/{id} (admin)
pub async fn delete_account<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(ctx): Extension<AuthContext>,
    Path(public_id): Path<String>,
) -> AuthResult<StatusCode>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    authorize::require(ctx.role, &[UserRole::Admin])?;

    let public_id = PublicId::parse_str(&public_id)?;

    let use_case = ManageUsersUseCase::new(state.repo.clone());
    use_case.delete(&public_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/users/{id}/role (admin)
pub async fn update_role<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Extension(ctx): Extension<AuthContext>,
    Path(public_id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> AuthResult<Json<AccountResponse>>
where
    R: AccountRepository + CredentialsRepository + RateLimitStore + Clone + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    authorize::require(ctx.role, &[UserRole::Admin])?;

    let public_id = PublicId::parse_str(&public_id)?;
    let role = UserRole::from_code(&req.role)?;

    let use_case = ManageUsersUseCase::new(state.repo.clone());
    let account = use_case.set_role(&public_id, role).await?;

    Ok(Json(AccountResponse::from_account(&account)))
}
