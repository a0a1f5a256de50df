//! Custom Axum extractors.

pub mod body;
pub mod current_user;

pub use body::{JsonBody, QueryParams};
pub use current_user::CurrentUser;
