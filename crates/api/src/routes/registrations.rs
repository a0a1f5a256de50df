//! Seat request routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use domain::models::{Registration, RegistrationView, SubmitRegistrationRequest};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::middleware::metrics::record_registration_submitted;

/// POST /api/v1/events/:event_id/registrations
///
/// Requests seats at an event. A repeat request for the same email while the
/// first is still pending adds to it.
pub async fn submit_registration(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    JsonBody(mut request): JsonBody<SubmitRegistrationRequest>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    request.event_id = event_id;
    let seats = request.seats;

    let registration = state.ledger()?.submit(request)?;
    record_registration_submitted(seats);

    Ok((StatusCode::CREATED, Json(registration)))
}

/// GET /api/v1/me/registrations
///
/// The signed-in user's registrations, matched by account email.
pub async fn my_registrations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<RegistrationView>>, ApiError> {
    let registrations = state.ledger()?.list_for_user_detailed(&user.email)?;
    Ok(Json(registrations))
}
