//! Persistence layer for EventEase.
//!
//! This crate contains:
//! - Key-value store backends (in-memory, JSON files)
//! - Repository implementations over those stores
//! - Storage metrics

pub mod metrics;
pub mod repositories;
pub mod stores;

pub use stores::{open_store, FileStore, MemoryStore, StorageBackend, StorageConfig};
