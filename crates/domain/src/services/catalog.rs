//! Event catalog port and admin catalog operations.

use std::sync::RwLock;

use tracing::info;
use validator::Validate;

use crate::error::{DomainError, StoreError};
use crate::models::{
    next_event_id, sample_events, CreateEventRequest, Event, EventFilter, UpdateEventRequest,
};

/// Persisted mapping from event identifier to event record.
pub trait CatalogStore: Send + Sync {
    /// All events in catalog order.
    fn get_all(&self) -> Result<Vec<Event>, DomainError>;

    fn get_by_id(&self, id: &str) -> Result<Option<Event>, DomainError>;

    /// Replaces the stored event with the same id. Fails with `NotFound` if
    /// there is none.
    fn update(&self, event: &Event) -> Result<(), DomainError>;

    /// Adds a new event. Fails with `Conflict` if the id is taken.
    fn append(&self, event: Event) -> Result<(), DomainError>;

    /// Removes the event with `id`, returning whether it existed.
    fn delete(&self, id: &str) -> Result<bool, DomainError>;
}

/// Catalog held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    events: RwLock<Vec<Event>>,
}

impl InMemoryCatalog {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }

    /// Catalog preloaded with the sample events.
    pub fn with_sample_events() -> Self {
        Self::new(sample_events())
    }
}

impl CatalogStore for InMemoryCatalog {
    fn get_all(&self) -> Result<Vec<Event>, DomainError> {
        let events = self.events.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(events.clone())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Event>, DomainError> {
        let events = self.events.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(events.iter().find(|e| e.id == id).cloned())
    }

    fn update(&self, event: &Event) -> Result<(), DomainError> {
        let mut events = self.events.write().map_err(|_| StoreError::LockPoisoned)?;
        let slot = events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| DomainError::NotFound(format!("Event {} not found", event.id)))?;
        *slot = event.clone();
        Ok(())
    }

    fn append(&self, event: Event) -> Result<(), DomainError> {
        let mut events = self.events.write().map_err(|_| StoreError::LockPoisoned)?;
        if events.iter().any(|e| e.id == event.id) {
            return Err(DomainError::Conflict(format!(
                "Event {} already exists",
                event.id
            )));
        }
        events.push(event);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let mut events = self.events.write().map_err(|_| StoreError::LockPoisoned)?;
        let before = events.len();
        events.retain(|e| e.id != id);
        Ok(events.len() != before)
    }
}

/// Looks up a single event, failing with `NotFound` when it is absent.
pub fn get_event<C: CatalogStore + ?Sized>(catalog: &C, id: &str) -> Result<Event, DomainError> {
    catalog
        .get_by_id(id)?
        .ok_or_else(|| DomainError::NotFound(format!("Event {} not found", id)))
}

/// Events matching `filter`, in catalog order.
pub fn search_events<C: CatalogStore + ?Sized>(
    catalog: &C,
    filter: &EventFilter,
) -> Result<Vec<Event>, DomainError> {
    Ok(catalog
        .get_all()?
        .into_iter()
        .filter(|e| filter.matches(e))
        .collect())
}

/// Validates and stores a new event under the next free identifier.
pub fn create_event<C: CatalogStore + ?Sized>(
    catalog: &C,
    request: CreateEventRequest,
) -> Result<Event, DomainError> {
    request.validate()?;

    let id = next_event_id(&catalog.get_all()?)?;
    let event = request.into_event(id);
    catalog.append(event.clone())?;

    info!(event_id = %event.id, title = %event.title, "Event created");
    Ok(event)
}

/// Applies an admin edit to an existing event.
pub fn edit_event<C: CatalogStore + ?Sized>(
    catalog: &C,
    id: &str,
    request: UpdateEventRequest,
) -> Result<Event, DomainError> {
    request.validate()?;

    let mut event = get_event(catalog, id)?;
    request.apply_to(&mut event);
    catalog.update(&event)?;

    info!(event_id = %event.id, seats = event.seats_available, "Event updated");
    Ok(event)
}

/// Deletes an event. Registrations that reference it are left in place.
pub fn delete_event<C: CatalogStore + ?Sized>(catalog: &C, id: &str) -> Result<(), DomainError> {
    if !catalog.delete(id)? {
        return Err(DomainError::NotFound(format!("Event {} not found", id)));
    }
    info!(event_id = %id, "Event deleted");
    Ok(())
}
