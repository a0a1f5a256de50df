//! Event repository backed by a key-value store.

use std::sync::Mutex;

use tracing::{debug, warn};

use domain::models::{sample_events, Event};
use domain::services::{load_json, save_json, CatalogStore, KeyValueStore, EVENTS_KEY};
use domain::{DomainError, StoreError};

use crate::metrics::StoreTimer;

/// Event catalog stored as a JSON list under [`EVENTS_KEY`].
///
/// When the key is missing, or holds something that is not an event list,
/// the catalog is reset to the sample events.
pub struct EventRepository<S> {
    store: S,
    // Serializes read-modify-write cycles on the events key
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> EventRepository<S> {
    /// Creates a new EventRepository over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn load(&self) -> Result<Vec<Event>, DomainError> {
        let timer = StoreTimer::new("load_events");
        let loaded: Result<Option<Vec<Event>>, StoreError> = load_json(&self.store, EVENTS_KEY);
        timer.finish(loaded.is_ok());

        match loaded {
            Ok(Some(events)) => Ok(events),
            Ok(None) => {
                debug!("No stored events, seeding sample catalog");
                self.reseed()
            }
            Err(StoreError::Serialization(e)) => {
                warn!(error = %e, "Stored events unreadable, resetting to sample catalog");
                self.reseed()
            }
            Err(e) => Err(e.into()),
        }
    }

    fn reseed(&self) -> Result<Vec<Event>, DomainError> {
        let events = sample_events();
        self.save(&events)?;
        Ok(events)
    }

    fn save(&self, events: &[Event]) -> Result<(), DomainError> {
        let timer = StoreTimer::new("save_events");
        let result = save_json(&self.store, EVENTS_KEY, events);
        timer.finish(result.is_ok());
        Ok(result?)
    }

    fn modify<T>(
        &self,
        f: impl FnOnce(&mut Vec<Event>) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?;
        let mut events = self.load()?;
        let out = f(&mut events)?;
        self.save(&events)?;
        Ok(out)
    }
}

impl<S: KeyValueStore> CatalogStore for EventRepository<S> {
    fn get_all(&self) -> Result<Vec<Event>, DomainError> {
        self.load()
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Event>, DomainError> {
        Ok(self.load()?.into_iter().find(|e| e.id == id))
    }

    fn update(&self, event: &Event) -> Result<(), DomainError> {
        self.modify(|events| {
            let slot = events
                .iter_mut()
                .find(|e| e.id == event.id)
                .ok_or_else(|| DomainError::NotFound(format!("Event {} not found", event.id)))?;
            *slot = event.clone();
            Ok(())
        })
    }

    fn append(&self, event: Event) -> Result<(), DomainError> {
        self.modify(|events| {
            if events.iter().any(|e| e.id == event.id) {
                return Err(DomainError::Conflict(format!(
                    "Event {} already exists",
                    event.id
                )));
            }
            events.push(event);
            Ok(())
        })
    }

    fn delete(&self, id: &str) -> Result<bool, DomainError> {
        self.modify(|events| {
            let before = events.len();
            events.retain(|e| e.id != id);
            Ok(events.len() != before)
        })
    }
}
