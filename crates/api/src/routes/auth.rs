//! Authentication routes: sign-up, login and logout.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;

use domain::models::{LoginRequest, SignUpRequest, UserSummary};
use domain::services::AccountService;
use domain::DomainError;

use crate::app::{AppState, SharedStore};
use crate::error::ApiError;
use crate::extractors::JsonBody;
use crate::middleware::SessionToken;

/// Response body for a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub user: UserSummary,
}

/// Runs an account operation on the blocking pool (password hashing).
async fn with_accounts<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AccountService<SharedStore>) -> Result<T, DomainError>
        + Send
        + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || {
        let accounts = state.accounts()?;
        f(&*accounts).map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Account task failed: {}", e)))?
}

/// Create an account.
///
/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignUpRequest>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    let user = with_accounts(&state, move |accounts| accounts.sign_up(request)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Sign in and open a session.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = with_accounts(&state, move |accounts| accounts.login(request)).await?;
    let token = state.sessions.create(user.clone());

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user,
    }))
}

/// End the current session.
///
/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> StatusCode {
    state.sessions.revoke(&token);
    StatusCode::NO_CONTENT
}
