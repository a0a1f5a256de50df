//! Admin user management routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use domain::models::{UpdateUserRoleRequest, UserSummary};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, JsonBody};

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.accounts()?.list_users()?))
}

/// DELETE /api/v1/admin/users/:user_id
///
/// Removes the account and ends its open sessions.
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.accounts()?.delete_user(user_id)?;
    let revoked = state.sessions.revoke_user(user_id);

    info!(
        admin_id = %admin.id,
        user_id = %user_id,
        sessions_revoked = revoked,
        "Admin deleted user"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/admin/users/:user_id/role
///
/// Open sessions of the account pick up the new role immediately.
pub async fn update_user_role(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Path(user_id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateUserRoleRequest>,
) -> Result<Json<UserSummary>, ApiError> {
    let user = state.accounts()?.set_role(user_id, request.role)?;
    state.sessions.refresh_user(&user);

    info!(
        admin_id = %admin.id,
        user_id = %user_id,
        role = %user.role,
        "Admin changed user role"
    );
    Ok(Json(user))
}
