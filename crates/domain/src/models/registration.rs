//! Registration domain models for the seat request workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::validation::emails_match;

/// Placeholder title for registrations whose event no longer exists.
pub const UNKNOWN_EVENT_TITLE: &str = "Unknown";

/// Status of a registration.
///
/// `Pending` moves exactly once to `Approved` or `Rejected`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RegistrationStatus::Pending)
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationStatus::Pending => write!(f, "pending"),
            RegistrationStatus::Approved => write!(f, "approved"),
            RegistrationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// One user's request for seats at one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub event_id: String,
    pub fullname: String,
    pub email: String,
    pub seats: u32,
    pub status: RegistrationStatus,
    pub request_date: DateTime<Utc>,
}

impl Registration {
    /// True if this registration belongs to the `(event_id, email)` pair.
    pub fn is_for(&self, event_id: &str, email: &str) -> bool {
        self.event_id == event_id && emails_match(&self.email, email)
    }

    pub fn is_pending(&self) -> bool {
        self.status == RegistrationStatus::Pending
    }
}

/// Request payload for submitting a registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRegistrationRequest {
    #[serde(default)]
    pub event_id: String,

    #[validate(custom(function = "shared::validation::validate_person_name"))]
    pub fullname: String,

    /// Must be a well-formed address, not just non-blank.
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,

    #[validate(range(min = 1, message = "At least one seat must be requested"))]
    pub seats: u32,
}

/// Identifies the pending registration an admin decision applies to.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDecisionRequest {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub event_id: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub email: String,
}

/// A registration joined with its event's display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationView {
    #[serde(flatten)]
    pub registration: Registration,
    pub event_title: String,
}

impl RegistrationView {
    /// Joins a registration with the title of its event, or the placeholder
    /// title when the event is gone.
    pub fn new(registration: Registration, event_title: Option<String>) -> Self {
        Self {
            registration,
            event_title: event_title.unwrap_or_else(|| UNKNOWN_EVENT_TITLE.to_string()),
        }
    }
}
