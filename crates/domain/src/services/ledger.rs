//! Registration ledger: the submit / approve / reject workflow.
//!
//! The ledger owns the registration list and persists it under
//! [`REGISTRATIONS_KEY`] after every change. Events are referenced by id and
//! resolved through the catalog when needed; approving a registration is the
//! only operation that touches an event, and it does so with a single
//! check-and-decrement.
//!
//! Capacity is only enforced at approval time. Any number of pending
//! registrations may exceed the seats an event has left; the admin decides
//! which ones to approve.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{error, info, warn};
use validator::Validate;

use super::catalog::CatalogStore;
use super::storage::{load_json, save_json, KeyValueStore, REGISTRATIONS_KEY};
use crate::error::DomainError;
use crate::models::{
    Event, Registration, RegistrationStatus, RegistrationView, SubmitRegistrationRequest,
};
use shared::validation::emails_match;

/// Owner of all registration records.
pub struct Ledger<C, S> {
    catalog: C,
    store: S,
    registrations: Vec<Registration>,
}

impl<C, S> Ledger<C, S>
where
    C: CatalogStore,
    S: KeyValueStore,
{
    /// Opens the ledger, loading any registrations already in `store`.
    pub fn open(catalog: C, store: S) -> Result<Self, DomainError> {
        let registrations: Vec<Registration> =
            load_json(&store, REGISTRATIONS_KEY)?.unwrap_or_default();
        info!(count = registrations.len(), "Registration ledger opened");
        Ok(Self {
            catalog,
            store,
            registrations,
        })
    }

    /// The catalog this ledger resolves events through.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Submits a seat request.
    ///
    /// A second submission for a pair that is still pending is merged into the
    /// existing record: the seat counts are added and the request date is
    /// refreshed.
    pub fn submit(
        &mut self,
        request: SubmitRegistrationRequest,
    ) -> Result<Registration, DomainError> {
        let request = SubmitRegistrationRequest {
            event_id: request.event_id.trim().to_string(),
            fullname: request.fullname.trim().to_string(),
            email: request.email.trim().to_string(),
            seats: request.seats,
        };
        request.validate()?;

        if self.catalog.get_by_id(&request.event_id)?.is_none() {
            return Err(DomainError::NotFound(format!(
                "Event {} not found",
                request.event_id
            )));
        }

        let mut next = self.registrations.clone();
        let index = match find_pending(&next, &request.event_id, &request.email) {
            Some(index) => {
                let existing = &mut next[index];
                existing.seats = existing.seats.checked_add(request.seats).ok_or_else(|| {
                    DomainError::Validation("Requested seat count is too large".to_string())
                })?;
                existing.request_date = Utc::now();
                info!(
                    event_id = %existing.event_id,
                    email = %existing.email,
                    seats = existing.seats,
                    "Merged registration into pending request"
                );
                index
            }
            None => {
                next.push(Registration {
                    event_id: request.event_id,
                    fullname: request.fullname,
                    email: request.email,
                    seats: request.seats,
                    status: RegistrationStatus::Pending,
                    request_date: Utc::now(),
                });
                let index = next.len() - 1;
                info!(
                    event_id = %next[index].event_id,
                    email = %next[index].email,
                    seats = next[index].seats,
                    "Registration submitted"
                );
                index
            }
        };

        self.commit(next)?;
        Ok(self.registrations[index].clone())
    }

    /// Approves the pending registration for `(event_id, email)` and takes its
    /// seats from the event.
    ///
    /// Nothing changes when the event cannot cover the request.
    pub fn approve(
        &mut self,
        event_id: &str,
        email: &str,
    ) -> Result<(Event, Registration), DomainError> {
        let index = self.pending_index(event_id, email)?;
        let requested = self.registrations[index].seats;

        let event = self
            .catalog
            .get_by_id(event_id)?
            .ok_or_else(|| DomainError::NotFound(format!("Event {} not found", event_id)))?;

        let updated = match event.with_seats_taken(requested) {
            Some(updated) => updated,
            None => {
                warn!(
                    event_id = %event_id,
                    available = event.seats_available,
                    requested,
                    "Approval refused: not enough seats"
                );
                return Err(DomainError::InsufficientSeats {
                    available: event.seats_available,
                    requested,
                });
            }
        };

        self.catalog.update(&updated)?;

        let mut next = self.registrations.clone();
        next[index].status = RegistrationStatus::Approved;
        if let Err(err) = self.commit(next) {
            // Restore the seats taken above
            if let Err(revert_err) = self.catalog.update(&event) {
                error!(
                    event_id = %event_id,
                    error = %revert_err,
                    "Failed to restore seats after ledger write failure"
                );
            }
            return Err(err);
        }

        info!(
            event_id = %event_id,
            email = %email,
            seats = requested,
            seats_left = updated.seats_available,
            "Registration approved"
        );
        Ok((updated, self.registrations[index].clone()))
    }

    /// Rejects the pending registration for `(event_id, email)`. The event is
    /// not touched.
    pub fn reject(&mut self, event_id: &str, email: &str) -> Result<Registration, DomainError> {
        let index = self.pending_index(event_id, email)?;

        let mut next = self.registrations.clone();
        next[index].status = RegistrationStatus::Rejected;
        self.commit(next)?;

        info!(event_id = %event_id, email = %email, "Registration rejected");
        Ok(self.registrations[index].clone())
    }

    /// Every registration made with `email`, oldest first, in any status.
    pub fn list_for_user(&self, email: &str) -> Vec<Registration> {
        self.registrations
            .iter()
            .filter(|r| emails_match(&r.email, email))
            .cloned()
            .collect()
    }

    /// Like [`list_for_user`](Self::list_for_user), joined with event titles.
    pub fn list_for_user_detailed(&self, email: &str) -> Result<Vec<RegistrationView>, DomainError> {
        self.with_titles(self.registrations.iter().filter(|r| emails_match(&r.email, email)))
    }

    /// Pending registrations joined with event titles.
    pub fn list_pending(&self) -> Result<Vec<RegistrationView>, DomainError> {
        self.with_titles(self.registrations.iter().filter(|r| r.is_pending()))
    }

    /// All registrations joined with event titles.
    pub fn list_all(&self) -> Result<Vec<RegistrationView>, DomainError> {
        self.with_titles(self.registrations.iter())
    }

    fn pending_index(&self, event_id: &str, email: &str) -> Result<usize, DomainError> {
        find_pending(&self.registrations, event_id, email).ok_or_else(|| {
            DomainError::NotFound(format!(
                "No pending registration for {} at event {}",
                email, event_id
            ))
        })
    }

    fn with_titles<'a>(
        &self,
        registrations: impl Iterator<Item = &'a Registration>,
    ) -> Result<Vec<RegistrationView>, DomainError> {
        let titles: HashMap<String, String> = self
            .catalog
            .get_all()?
            .into_iter()
            .map(|e| (e.id, e.title))
            .collect();

        Ok(registrations
            .map(|r| RegistrationView::new(r.clone(), titles.get(&r.event_id).cloned()))
            .collect())
    }

    /// Persists `next` and adopts it as the current state.
    fn commit(&mut self, next: Vec<Registration>) -> Result<(), DomainError> {
        save_json(&self.store, REGISTRATIONS_KEY, &next)?;
        self.registrations = next;
        Ok(())
    }
}

fn find_pending(registrations: &[Registration], event_id: &str, email: &str) -> Option<usize> {
    registrations
        .iter()
        .position(|r| r.is_pending() && r.is_for(event_id, email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::{sample_events, UNKNOWN_EVENT_TITLE};
    use crate::services::catalog::InMemoryCatalog;
    use crate::services::storage::MemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    type TestLedger = Ledger<InMemoryCatalog, Arc<MemoryStore>>;

    fn ledger() -> TestLedger {
        Ledger::open(
            InMemoryCatalog::with_sample_events(),
            Arc::new(MemoryStore::new()),
        )
        .unwrap()
    }

    fn ledger_with_seats(seats: u32) -> TestLedger {
        let mut events = sample_events();
        events[0].seats_available = seats;
        Ledger::open(InMemoryCatalog::new(events), Arc::new(MemoryStore::new())).unwrap()
    }

    fn request(event_id: &str, fullname: &str, email: &str, seats: u32) -> SubmitRegistrationRequest {
        SubmitRegistrationRequest {
            event_id: event_id.to_string(),
            fullname: fullname.to_string(),
            email: email.to_string(),
            seats,
        }
    }

    fn seats_of(ledger: &TestLedger, id: &str) -> u32 {
        ledger.catalog().get_by_id(id).unwrap().unwrap().seats_available
    }

    #[test]
    fn test_submit_then_approve_decrements_seats() {
        let mut ledger = ledger();
        let reg = ledger
            .submit(request("E1001", "Ada", "ada@x.com", 5))
            .unwrap();
        assert_eq!(reg.status, RegistrationStatus::Pending);
        assert_eq!(reg.seats, 5);
        assert_eq!(ledger.list_all().unwrap().len(), 1);

        let (event, reg) = ledger.approve("E1001", "ada@x.com").unwrap();
        assert_eq!(event.seats_available, 195);
        assert_eq!(seats_of(&ledger, "E1001"), 195);
        assert_eq!(reg.status, RegistrationStatus::Approved);
    }

    #[test]
    fn test_repeat_submission_merges_seats() {
        let mut ledger = ledger();
        let first = ledger
            .submit(request("E1001", "Ada", "ada@x.com", 5))
            .unwrap();
        let merged = ledger
            .submit(request("E1001", "Ada", "ADA@x.com", 3))
            .unwrap();

        assert_eq!(merged.seats, 8);
        assert!(merged.request_date >= first.request_date);
        assert_eq!(ledger.list_pending().unwrap().len(), 1);
        assert_eq!(ledger.list_for_user("ada@x.com").len(), 1);
    }

    #[test]
    fn test_insufficient_seats_leaves_state_untouched() {
        let mut ledger = ledger_with_seats(4);
        ledger
            .submit(request("E1001", "Ada", "ada@x.com", 10))
            .unwrap();

        let result = ledger.approve("E1001", "ada@x.com");
        match result {
            Err(DomainError::InsufficientSeats {
                available,
                requested,
            }) => {
                assert_eq!(available, 4);
                assert_eq!(requested, 10);
            }
            other => panic!("expected InsufficientSeats, got {:?}", other),
        }
        assert_eq!(seats_of(&ledger, "E1001"), 4);
        assert_eq!(
            ledger.list_for_user("ada@x.com")[0].status,
            RegistrationStatus::Pending
        );
    }

    #[test]
    fn test_reject_leaves_seats_unchanged() {
        let mut ledger = ledger();
        ledger
            .submit(request("E1001", "Ada", "ada@x.com", 5))
            .unwrap();

        let reg = ledger.reject("E1001", "ada@x.com").unwrap();
        assert_eq!(reg.status, RegistrationStatus::Rejected);
        assert_eq!(seats_of(&ledger, "E1001"), 200);
    }

    #[test]
    fn test_double_approval_is_not_found() {
        let mut ledger = ledger();
        ledger
            .submit(request("E1001", "Ada", "ada@x.com", 5))
            .unwrap();
        ledger.approve("E1001", "ada@x.com").unwrap();

        assert!(matches!(
            ledger.approve("E1001", "ada@x.com"),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            ledger.reject("E1001", "ada@x.com"),
            Err(DomainError::NotFound(_))
        ));
        assert_eq!(seats_of(&ledger, "E1001"), 195);
    }

    #[test]
    fn test_approve_exact_capacity_reaches_zero() {
        let mut ledger = ledger_with_seats(6);
        ledger.submit(request("E1001", "Ada", "ada@x.com", 6)).unwrap();
        let (event, _) = ledger.approve("E1001", "ada@x.com").unwrap();
        assert_eq!(event.seats_available, 0);

        ledger.submit(request("E1001", "Bob", "bob@x.com", 1)).unwrap();
        assert!(matches!(
            ledger.approve("E1001", "bob@x.com"),
            Err(DomainError::InsufficientSeats { available: 0, requested: 1 })
        ));
    }

    #[test]
    fn test_overbooking_is_allowed_while_pending() {
        let mut ledger = ledger_with_seats(5);
        ledger.submit(request("E1001", "Ada", "ada@x.com", 4)).unwrap();
        ledger.submit(request("E1001", "Bob", "bob@x.com", 4)).unwrap();
        assert_eq!(ledger.list_pending().unwrap().len(), 2);

        ledger.approve("E1001", "ada@x.com").unwrap();
        assert!(matches!(
            ledger.approve("E1001", "bob@x.com"),
            Err(DomainError::InsufficientSeats { available: 1, requested: 4 })
        ));
    }

    #[test]
    fn test_new_submission_after_decision_creates_new_record() {
        let mut ledger = ledger();
        ledger.submit(request("E1001", "Ada", "ada@x.com", 2)).unwrap();
        ledger.reject("E1001", "ada@x.com").unwrap();
        ledger.submit(request("E1001", "Ada", "ada@x.com", 3)).unwrap();

        let regs = ledger.list_for_user("ada@x.com");
        assert_eq!(regs.len(), 2);
        assert_eq!(regs[0].status, RegistrationStatus::Rejected);
        assert_eq!(regs[1].status, RegistrationStatus::Pending);
        assert_eq!(regs[1].seats, 3);
    }

    #[test]
    fn test_submit_validation_errors() {
        let mut ledger = ledger();
        for bad in [
            request("E1001", "", "ada@x.com", 1),
            request("E1001", "Ada", "  ", 1),
            request("E1001", "Ada", "ada@x.com", 0),
        ] {
            assert!(matches!(
                ledger.submit(bad),
                Err(DomainError::Validation(_))
            ));
        }
        assert!(ledger.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_submit_unknown_event() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.submit(request("E9999", "Ada", "ada@x.com", 1)),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn test_submit_trims_input() {
        let mut ledger = ledger();
        let reg = ledger
            .submit(request(" E1001 ", "  Ada  ", " ada@x.com ", 1))
            .unwrap();
        assert_eq!(reg.event_id, "E1001");
        assert_eq!(reg.fullname, "Ada");
        assert_eq!(reg.email, "ada@x.com");
    }

    #[test]
    fn test_approve_and_reject_unknown_pair() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.approve("E1001", "nobody@x.com"),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            ledger.reject("E1001", "nobody@x.com"),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn test_deleted_event_shows_placeholder_and_blocks_approval() {
        let mut ledger = ledger();
        ledger.submit(request("E1002", "Ada", "ada@x.com", 2)).unwrap();
        ledger.catalog().delete("E1002").unwrap();

        let pending = ledger.list_pending().unwrap();
        assert_eq!(pending[0].event_title, UNKNOWN_EVENT_TITLE);
        assert!(matches!(
            ledger.approve("E1002", "ada@x.com"),
            Err(DomainError::NotFound(_))
        ));
        // The dangling registration can still be rejected
        ledger.reject("E1002", "ada@x.com").unwrap();
    }

    #[test]
    fn test_list_for_user_keeps_insertion_order_across_events() {
        let mut ledger = ledger();
        ledger.submit(request("E1003", "Ada", "ada@x.com", 1)).unwrap();
        ledger.submit(request("E1001", "Bob", "bob@x.com", 1)).unwrap();
        ledger.submit(request("E1001", "Ada", "Ada@X.com", 2)).unwrap();

        let ids: Vec<_> = ledger
            .list_for_user("ada@x.com")
            .into_iter()
            .map(|r| r.event_id)
            .collect();
        assert_eq!(ids, vec!["E1003", "E1001"]);

        let detailed = ledger.list_for_user_detailed("ada@x.com").unwrap();
        assert_eq!(detailed[0].event_title, "Campus Meetup");
        assert_eq!(detailed[1].event_title, "AI & Society Conference");
    }

    #[test]
    fn test_list_pending_excludes_decided() {
        let mut ledger = ledger();
        ledger.submit(request("E1001", "Ada", "ada@x.com", 1)).unwrap();
        ledger.submit(request("E1002", "Bob", "bob@x.com", 1)).unwrap();
        ledger.approve("E1001", "ada@x.com").unwrap();

        let pending = ledger.list_pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].registration.email, "bob@x.com");
        assert_eq!(pending[0].event_title, "Web Dev Workshop");
    }

    #[test]
    fn test_registrations_survive_reopen() {
        let store = Arc::new(MemoryStore::new());
        let catalog = InMemoryCatalog::with_sample_events();
        let mut ledger = Ledger::open(catalog, Arc::clone(&store)).unwrap();
        ledger.submit(request("E1001", "Ada", "ada@x.com", 5)).unwrap();
        ledger.submit(request("E1002", "Bob", "bob@x.com", 1)).unwrap();
        ledger.reject("E1002", "bob@x.com").unwrap();

        let reopened =
            Ledger::open(InMemoryCatalog::with_sample_events(), Arc::clone(&store)).unwrap();
        let all = reopened.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].registration.status, RegistrationStatus::Rejected);
    }

    /// Store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_saves: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.load(key)
        }

        fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.save(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_write_restores_event_seats() {
        let store = Arc::new(FlakyStore::default());
        let mut ledger =
            Ledger::open(InMemoryCatalog::with_sample_events(), Arc::clone(&store)).unwrap();
        ledger.submit(request("E1001", "Ada", "ada@x.com", 5)).unwrap();

        store.fail_saves.store(true, Ordering::SeqCst);
        assert!(matches!(
            ledger.approve("E1001", "ada@x.com"),
            Err(DomainError::Storage(_))
        ));
        assert_eq!(
            ledger.catalog().get_by_id("E1001").unwrap().unwrap().seats_available,
            200
        );
        assert!(ledger.list_for_user("ada@x.com")[0].is_pending());

        store.fail_saves.store(false, Ordering::SeqCst);
        ledger.approve("E1001", "ada@x.com").unwrap();
    }

    #[test]
    fn test_failed_submit_write_keeps_previous_state() {
        let store = Arc::new(FlakyStore::default());
        let mut ledger =
            Ledger::open(InMemoryCatalog::with_sample_events(), Arc::clone(&store)).unwrap();
        store.fail_saves.store(true, Ordering::SeqCst);

        assert!(ledger.submit(request("E1001", "Ada", "ada@x.com", 5)).is_err());
        assert!(ledger.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_seats_never_negative_over_sequence() {
        let mut ledger = ledger_with_seats(10);
        let emails = ["a@x.com", "b@x.com", "c@x.com", "d@x.com", "e@x.com"];
        for (i, email) in emails.iter().enumerate() {
            ledger
                .submit(request("E1001", "Guest", email, (i as u32) + 2))
                .unwrap();
        }
        for email in emails {
            let before = seats_of(&ledger, "E1001");
            match ledger.approve("E1001", email) {
                Ok((event, reg)) => {
                    assert!(before >= reg.seats);
                    assert_eq!(event.seats_available, before - reg.seats);
                }
                Err(DomainError::InsufficientSeats { available, .. }) => {
                    assert_eq!(available, before);
                }
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        // 2, 3 and 4 fit; 5 and 6 do not fit in the single seat left
        assert_eq!(seats_of(&ledger, "E1001"), 1);
    }
}
