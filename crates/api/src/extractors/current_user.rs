//! Signed-in user extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use domain::models::UserSummary;

use crate::error::ApiError;

/// The account behind the request's session.
///
/// Inserted by the session middleware; extracting it on a route without that
/// middleware is rejected as unauthorized.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserSummary);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Sign in required".to_string()))
    }
}
