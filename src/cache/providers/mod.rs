//! Cache provider implementations

pub mod memory;
pub mod noop;
pub mod redis;

#[cfg(test)]
pub(crate) mod failing;

pub use memory::InMemoryCacheService;
pub use noop::NoOpCacheService;
pub use self::redis::RedisCacheService;

#[cfg(test)]
pub(crate) use failing::{FailingCacheService, FailureMode};
