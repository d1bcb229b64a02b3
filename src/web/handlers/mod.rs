//! # Web API Handlers
//!
//! Thin adapters from HTTP to the services. Reads return [`CachedJson`] so
//! the `x-cache` header can be set; writes return plain JSON.
//!
//! [`CachedJson`]: crate::web::response::CachedJson

pub mod analytics;
pub mod goals;
pub mod health;
pub mod rewards;
pub mod subtasks;
pub mod users;
