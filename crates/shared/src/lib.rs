//! Shared utilities and common types for the EventEase backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Password hashing with Argon2id
//! - Common field validation logic

pub mod password;
pub mod validation;
