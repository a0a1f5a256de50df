//! Repository implementations over key-value stores.

pub mod event;

pub use event::EventRepository;
