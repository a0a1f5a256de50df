//! Event domain model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DomainError;

lazy_static::lazy_static! {
    /// Event identifiers are `E` followed by a numeric suffix.
    pub static ref EVENT_ID_REGEX: regex::Regex = regex::Regex::new(r"^E(\d+)$").unwrap();
}

/// Prefix of every generated event identifier.
pub const EVENT_ID_PREFIX: &str = "E";

/// Kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Conference,
    Workshop,
    Meetup,
    Seminar,
    Other,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Conference => write!(f, "conference"),
            EventCategory::Workshop => write!(f, "workshop"),
            EventCategory::Meetup => write!(f, "meetup"),
            EventCategory::Seminar => write!(f, "seminar"),
            EventCategory::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conference" => Ok(EventCategory::Conference),
            "workshop" => Ok(EventCategory::Workshop),
            "meetup" => Ok(EventCategory::Meetup),
            "seminar" => Ok(EventCategory::Seminar),
            "other" => Ok(EventCategory::Other),
            _ => Err(format!("Invalid event category: {}", s)),
        }
    }
}

/// A bookable activity with a finite number of seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub location: String,
    pub category: EventCategory,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "numberOfSeats", alias = "seatsAvailable")]
    pub seats_available: u32,
}

impl Event {
    /// Numeric suffix of the identifier, if it follows the `E<digits>` format.
    pub fn numeric_id(&self) -> Option<u64> {
        parse_event_number(&self.id)
    }

    /// Returns a copy with `seats` removed from the available count, or
    /// `None` when the event cannot cover the request.
    pub fn with_seats_taken(&self, seats: u32) -> Option<Event> {
        let remaining = self.seats_available.checked_sub(seats)?;
        Some(Event {
            seats_available: remaining,
            ..self.clone()
        })
    }
}

/// Extracts the numeric suffix of an event identifier.
pub fn parse_event_number(id: &str) -> Option<u64> {
    EVENT_ID_REGEX
        .captures(id)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Next unused identifier: one past the largest numeric suffix in `events`.
pub fn next_event_id(events: &[Event]) -> Result<String, DomainError> {
    let max = events.iter().filter_map(Event::numeric_id).max().unwrap_or(0);
    let next = max
        .checked_add(1)
        .ok_or_else(|| DomainError::Conflict("No event identifiers left".to_string()))?;
    Ok(format!("{}{}", EVENT_ID_PREFIX, next))
}

/// Request payload for creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: String,

    pub date: NaiveDate,

    #[validate(
        length(min = 1, max = 200, message = "Location must be between 1 and 200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub location: String,

    pub category: EventCategory,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: String,

    #[serde(default, rename = "numberOfSeats", alias = "seatsAvailable")]
    pub seats_available: u32,
}

impl CreateEventRequest {
    /// Builds the event record under the given identifier.
    pub fn into_event(self, id: String) -> Event {
        Event {
            id,
            title: self.title.trim().to_string(),
            date: self.date,
            location: self.location.trim().to_string(),
            category: self.category,
            description: self.description.trim().to_string(),
            seats_available: self.seats_available,
        }
    }
}

/// Request payload for editing an event. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: Option<String>,

    pub date: Option<NaiveDate>,

    #[validate(
        length(min = 1, max = 200, message = "Location must be between 1 and 200 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub location: Option<String>,

    pub category: Option<EventCategory>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[serde(rename = "numberOfSeats", alias = "seatsAvailable")]
    pub seats_available: Option<u32>,
}

impl UpdateEventRequest {
    /// Applies the present fields to `event`.
    pub fn apply_to(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title.trim().to_string();
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(location) = self.location {
            event.location = location.trim().to_string();
        }
        if let Some(category) = self.category {
            event.category = category;
        }
        if let Some(description) = self.description {
            event.description = description.trim().to_string();
        }
        if let Some(seats) = self.seats_available {
            event.seats_available = seats;
        }
    }
}

/// Search criteria for browsing the catalog. Empty criteria match everything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    /// Substring of the event id or title (case-insensitive).
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub date: Option<NaiveDate>,
    /// Substring of the location (case-insensitive).
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<EventCategory>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub min_seats: Option<u32>,
}

/// Reads an optional query value, treating a blank string as absent.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(q) = non_empty(&self.q) {
            let q = q.to_lowercase();
            if !event.id.to_lowercase().contains(&q) && !event.title.to_lowercase().contains(&q) {
                return false;
            }
        }
        if let Some(date) = self.date {
            if event.date != date {
                return false;
            }
        }
        if let Some(location) = non_empty(&self.location) {
            if !event
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }
        if let Some(category) = self.category {
            if event.category != category {
                return false;
            }
        }
        event.seats_available >= self.min_seats.unwrap_or(0)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Catalog contents used when no events have been stored yet.
pub fn sample_events() -> Vec<Event> {
    let event = |id: &str,
                 title: &str,
                 (y, m, d): (i32, u32, u32),
                 location: &str,
                 category: EventCategory,
                 description: &str,
                 seats: u32| Event {
        id: id.to_string(),
        title: title.to_string(),
        date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN),
        location: location.to_string(),
        category,
        description: description.to_string(),
        seats_available: seats,
    };

    vec![
        event(
            "E1001",
            "AI & Society Conference",
            (2025, 11, 10),
            "Cairo Convention Center",
            EventCategory::Conference,
            "A conference about AI impacts.",
            200,
        ),
        event(
            "E1002",
            "Web Dev Workshop",
            (2025, 10, 28),
            "Giza Tech Hub",
            EventCategory::Workshop,
            "Hands-on workshop on modern web.",
            40,
        ),
        event(
            "E1003",
            "Campus Meetup",
            (2025, 12, 2),
            "AUC Campus",
            EventCategory::Meetup,
            "Student meetup for networking.",
            100,
        ),
    ]
}
