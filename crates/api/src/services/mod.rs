//! Process-local services used by the HTTP layer.

pub mod sessions;

pub use sessions::SessionStore;
