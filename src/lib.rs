#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Goaltrack Core
//!
//! Goal tracking service core: goals, subtasks, rewards, user profiles and a
//! per-user analytics dashboard, served over HTTP with a best-effort
//! read-through cache in front of the document store.
//!
//! ## Caching model
//!
//! - Every read goes through [`cache::CacheLayer::read_through`]. A cache
//!   failure is logged and treated as a miss; the store answers instead.
//! - Query results (lists, dashboards) are recorded in a per-user key
//!   registry. A write for a user drains that registry, so no stale list
//!   survives a committed write.
//! - Subtask writes recompute the parent goal's progress synchronously and
//!   invalidate the goal before returning.
//! - Keys are derived deterministically from normalised request parameters
//!   and live under a versioned namespace (`goaltrack:v1:...`).
//!
//! ## Module Organization
//!
//! - [`cache`] - cache client, backends, keys, read-through and invalidation
//! - [`config`] - layered configuration
//! - [`error`] - service error type
//! - [`models`] - domain entities and query parameters
//! - [`store`] - document store seam and the in-memory store
//! - [`services`] - domain operations with caching
//! - [`web`] - axum router, handlers and middleware
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use goaltrack_core::config::ConfigManager;
//! use goaltrack_core::store::InMemoryStore;
//! use goaltrack_core::web::{create_app, state::AppState};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let state = AppState::from_config(manager.config().clone(), Arc::new(InMemoryStore::new())).await;
//! let app = create_app(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;
pub mod web;

pub use cache::{CacheClient, CacheLayer, CacheStatus, Cached, InvalidationReport};
pub use config::{CacheConfig, ConfigManager, GoaltrackConfig};
pub use error::{GoaltrackError, Result};
pub use services::Services;
pub use store::{DocumentStore, InMemoryStore, StoreError};
