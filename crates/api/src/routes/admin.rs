//! Admin routes for the event catalog and registration review.
//!
//! These routes require a session whose account has the admin role.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use domain::models::{
    CreateEventRequest, Event, Registration, RegistrationDecisionRequest, RegistrationView,
    UpdateEventRequest,
};
use domain::services::{create_event as add_event, delete_event as remove_event, edit_event};
use domain::DomainError;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::middleware::metrics::{
    record_approval_refused, record_registration_decided, record_seats_approved,
};

/// Response for an approval: the updated event and registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponse {
    pub event: Event,
    pub registration: Registration,
}

/// POST /api/v1/admin/events
pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    JsonBody(request): JsonBody<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let ledger = state.ledger()?;
    let event = add_event(ledger.catalog(), request)?;

    info!(admin_id = %admin.id, event_id = %event.id, "Admin created event");
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/v1/admin/events/:event_id
///
/// Partial update: omitted fields keep their value.
pub async fn update_event(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Path(event_id): Path<String>,
    JsonBody(request): JsonBody<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    let ledger = state.ledger()?;
    let event = edit_event(ledger.catalog(), &event_id, request)?;

    info!(admin_id = %admin.id, event_id = %event.id, "Admin updated event");
    Ok(Json(event))
}

/// DELETE /api/v1/admin/events/:event_id
///
/// Registrations for the event are kept and listed under a placeholder title.
pub async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Path(event_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let ledger = state.ledger()?;
    remove_event(ledger.catalog(), &event_id)?;

    info!(admin_id = %admin.id, event_id = %event_id, "Admin deleted event");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/registrations
pub async fn list_registrations(
    State(state): State<AppState>,
) -> Result<Json<Vec<RegistrationView>>, ApiError> {
    Ok(Json(state.ledger()?.list_all()?))
}

/// GET /api/v1/admin/registrations/pending
pub async fn list_pending_registrations(
    State(state): State<AppState>,
) -> Result<Json<Vec<RegistrationView>>, ApiError> {
    Ok(Json(state.ledger()?.list_pending()?))
}

/// POST /api/v1/admin/registrations/approve
///
/// Takes the requested seats from the event. Refused with 409 when the event
/// has fewer seats left than requested; nothing changes in that case.
pub async fn approve_registration(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    JsonBody(request): JsonBody<RegistrationDecisionRequest>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    request.validate().map_err(DomainError::from)?;

    let result = state
        .ledger()?
        .approve(request.event_id.trim(), request.email.trim());

    let (event, registration) = match result {
        Ok(approved) => approved,
        Err(err @ DomainError::InsufficientSeats { .. }) => {
            record_approval_refused();
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    record_registration_decided("approved");
    record_seats_approved(registration.seats);
    info!(
        admin_id = %admin.id,
        event_id = %event.id,
        seats_left = event.seats_available,
        "Admin approved registration"
    );

    Ok(Json(ApprovalResponse {
        event,
        registration,
    }))
}

/// POST /api/v1/admin/registrations/reject
pub async fn reject_registration(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    JsonBody(request): JsonBody<RegistrationDecisionRequest>,
) -> Result<Json<Registration>, ApiError> {
    request.validate().map_err(DomainError::from)?;

    let registration = state
        .ledger()?
        .reject(request.event_id.trim(), request.email.trim())?;

    record_registration_decided("rejected");
    info!(
        admin_id = %admin.id,
        event_id = %registration.event_id,
        "Admin rejected registration"
    );

    Ok(Json(registration))
}
