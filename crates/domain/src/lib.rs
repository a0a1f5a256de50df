//! Domain layer for EventEase.
//!
//! This crate contains:
//! - Domain models (Event, Registration, User)
//! - Storage ports and the registration ledger
//! - Catalog and account services
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::{DomainError, StoreError};
