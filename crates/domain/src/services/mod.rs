//! Domain services for EventEase.
//!
//! Services contain business logic that operates on domain models.

pub mod accounts;
pub mod catalog;
pub mod ledger;
pub mod storage;

pub use accounts::AccountService;
pub use catalog::{
    create_event, delete_event, edit_event, get_event, search_events, CatalogStore,
    InMemoryCatalog,
};
pub use ledger::Ledger;
pub use storage::{
    load_json, save_json, KeyValueStore, MemoryStore, EVENTS_KEY, REGISTRATIONS_KEY, USERS_KEY,
};
