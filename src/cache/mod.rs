//! # Cache Module
//!
//! Best-effort, TTL-based caching in front of the document store.
//!
//! ## Architecture
//!
//! ```text
//! CacheLayer                       <- read_through / invalidate, contains failures
//!   └── Arc<CacheClient>           <- generation prefix, registry, delete ceiling
//!         └── CacheBackend (enum)  <- zero-cost dispatch, no vtable
//!               ├── Redis(RedisCacheService)   <- state machine + backoff reconnect
//!               ├── Memory(InMemoryCacheService)
//!               └── NoOp(NoOpCacheService)     <- always-miss fallback
//! ```
//!
//! - **Graceful degradation**: no cache misconfiguration stops startup, and no
//!   cache failure fails a request.
//! - **Per-user registry**: every query key cached for a user is recorded in
//!   `user_keys:{userId}`; any write by that user drains it.
//! - **SCAN for patterns**: generation purges never use `KEYS`.

pub mod client;
pub mod connection;
pub mod errors;
pub mod invalidation;
pub mod keys;
pub mod layer;
pub mod providers;
pub mod read_through;
pub mod traits;

pub use client::CacheClient;
pub use connection::{ConnectionState, ReconnectPolicy};
pub use errors::{CacheError, CacheResult};
pub use invalidation::InvalidationReport;
pub use keys::KeyParams;
pub use layer::CacheLayer;
pub use providers::{InMemoryCacheService, NoOpCacheService, RedisCacheService};
pub use read_through::{CacheStatus, Cached};
pub use traits::{CacheService, KeyFilter};
