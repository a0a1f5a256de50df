//! Domain models for EventEase.

pub mod event;
pub mod registration;
pub mod user;

pub use event::{
    next_event_id, sample_events, CreateEventRequest, Event, EventCategory, EventFilter,
    UpdateEventRequest,
};
pub use registration::{
    Registration, RegistrationDecisionRequest, RegistrationStatus, RegistrationView,
    SubmitRegistrationRequest, UNKNOWN_EVENT_TITLE,
};
pub use user::{LoginRequest, SignUpRequest, UpdateUserRoleRequest, User, UserRole, UserSummary};
