//! # Domain Services
//!
//! Each service pairs the document store with the cache layer. Reads go
//! through [`CacheLayer::read_through`]; writes commit to the store first and
//! then call [`CacheLayer::invalidate`] with the entity keys they touched and
//! the acting user.
//!
//! Entities belonging to another user are reported as not found.

pub mod analytics;
pub mod goals;
pub mod rewards;
pub mod subtasks;
pub mod users;

pub use analytics::AnalyticsService;
pub use goals::{compute_goal_progress, GoalService};
pub use rewards::RewardService;
pub use subtasks::SubtaskService;
pub use users::UserService;

use crate::cache::CacheLayer;
use crate::constants::progress;
use crate::error::{GoaltrackError, Result};
use crate::store::DocumentStore;
use std::sync::Arc;

/// Every service, sharing one store handle and one cache client
#[derive(Debug, Clone)]
pub struct Services {
    pub goals: GoalService,
    pub subtasks: SubtaskService,
    pub rewards: RewardService,
    pub users: UserService,
    pub analytics: AnalyticsService,
}

impl Services {
    pub fn new(store: Arc<dyn DocumentStore>, cache: CacheLayer) -> Self {
        let goals = GoalService::new(store.clone(), cache.clone());
        Self {
            subtasks: SubtaskService::new(store.clone(), cache.clone(), goals.clone()),
            rewards: RewardService::new(store.clone(), cache.clone()),
            users: UserService::new(store.clone(), cache.clone()),
            analytics: AnalyticsService::new(store, cache),
            goals,
        }
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Trimmed, non-empty title
pub(crate) fn validate_title(field: &str, title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(GoaltrackError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_progress(value: f64) -> Result<f64> {
    if !value.is_finite() || !(progress::MIN..=progress::MAX).contains(&value) {
        return Err(GoaltrackError::validation(format!(
            "progress must be between {} and {}, got {value}",
            progress::MIN,
            progress::MAX
        )));
    }
    Ok(value)
}
