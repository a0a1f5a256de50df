//! Public event catalog routes.

use axum::{
    extract::{Path, State},
    Json,
};

use domain::models::{Event, EventFilter};
use domain::services::{get_event as find_event, search_events};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::QueryParams;

/// GET /api/v1/events
///
/// Lists events matching the query filter (`q`, `date`, `location`,
/// `category`, `minSeats`). No filter lists the whole catalog.
pub async fn list_events(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<EventFilter>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let ledger = state.ledger()?;
    let events = search_events(ledger.catalog(), &filter)?;
    Ok(Json(events))
}

/// GET /api/v1/events/:event_id
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let ledger = state.ledger()?;
    Ok(Json(find_event(ledger.catalog(), &event_id)?))
}
