//! Session authentication middleware.
//!
//! Routes behind these layers need an `Authorization: Bearer <token>` header
//! naming an open session. The signed-in account and the token are stored in
//! request extensions for downstream handlers.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app::AppState;
use crate::extractors::CurrentUser;

/// Token of the session that authenticated the request.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn authenticate(state: &AppState, req: &mut Request<Body>) -> Result<CurrentUser, Response> {
    let token = bearer_token(req)
        .ok_or_else(|| unauthorized_response("Missing or invalid Authorization header"))?
        .to_string();

    let user = state.sessions.get(&token).ok_or_else(|| {
        tracing::debug!("Unknown session token");
        unauthorized_response("Invalid or expired session")
    })?;

    let current = CurrentUser(user);
    req.extensions_mut().insert(current.clone());
    req.extensions_mut().insert(SessionToken(token));
    Ok(current)
}

/// Middleware that requires a signed-in user.
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, &mut req) {
        Ok(_) => next.run(req).await,
        Err(response) => response,
    }
}

/// Middleware for admin-only routes.
///
/// Requires a signed-in user whose role is admin.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, &mut req) {
        Ok(CurrentUser(user)) if user.is_admin() => next.run(req).await,
        Ok(CurrentUser(user)) => {
            tracing::warn!(user_id = %user.id, "Non-admin attempted admin route");
            forbidden_response("Admin access required")
        }
        Err(response) => response,
    }
}

/// Helper to create unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}

/// Helper to create forbidden response.
fn forbidden_response(message: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "forbidden",
            "message": message
        })),
    )
        .into_response()
}
