//! Document store collaborator.
//!
//! The store owns entity data; the cache only ever holds copies of what the
//! store returned. Errors from here are the only ones callers see.

pub mod memory;

pub use memory::{InMemoryStore, StoreStats, StoreStatsSnapshot};

use crate::models::{
    Goal, GoalListParams, Page, Reward, RewardListParams, Subtask, SubtaskListParams, User,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("{collection} document not found: {id}")]
    NotFound { collection: &'static str, id: String },

    #[error("Conflict in {collection}: {message}")]
    Conflict {
        collection: &'static str,
        message: String,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent document store
///
/// `find_*` by id return `Ok(None)` for unknown ids; `update_*` and
/// `delete_*` on unknown ids return `StoreError::NotFound`. Ownership checks
/// are the caller's job.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    async fn create_user(&self, user: User) -> StoreResult<User>;
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn update_user(&self, user: User) -> StoreResult<User>;

    async fn create_goal(&self, goal: Goal) -> StoreResult<Goal>;
    async fn find_goal(&self, id: &str) -> StoreResult<Option<Goal>>;
    async fn find_goals(&self, user_id: &str, params: &GoalListParams) -> StoreResult<Page<Goal>>;
    async fn goals_for_user(&self, user_id: &str) -> StoreResult<Vec<Goal>>;
    async fn update_goal(&self, goal: Goal) -> StoreResult<Goal>;
    async fn delete_goal(&self, id: &str) -> StoreResult<()>;
    async fn count_goals(&self, user_id: &str) -> StoreResult<u64>;

    async fn create_subtask(&self, subtask: Subtask) -> StoreResult<Subtask>;
    async fn find_subtask(&self, id: &str) -> StoreResult<Option<Subtask>>;
    async fn find_subtasks(
        &self,
        goal_id: &str,
        params: &SubtaskListParams,
    ) -> StoreResult<Page<Subtask>>;
    async fn subtasks_for_goal(&self, goal_id: &str) -> StoreResult<Vec<Subtask>>;
    async fn subtasks_for_user(&self, user_id: &str) -> StoreResult<Vec<Subtask>>;
    async fn update_subtask(&self, subtask: Subtask) -> StoreResult<Subtask>;
    async fn delete_subtask(&self, id: &str) -> StoreResult<()>;
    /// Remove every subtask of a goal, returning the removed ids
    async fn delete_subtasks_for_goal(&self, goal_id: &str) -> StoreResult<Vec<String>>;

    async fn create_reward(&self, reward: Reward) -> StoreResult<Reward>;
    async fn find_reward(&self, id: &str) -> StoreResult<Option<Reward>>;
    async fn find_rewards(
        &self,
        user_id: &str,
        params: &RewardListParams,
    ) -> StoreResult<Page<Reward>>;
    async fn rewards_for_user(&self, user_id: &str) -> StoreResult<Vec<Reward>>;
    async fn update_reward(&self, reward: Reward) -> StoreResult<Reward>;
    async fn delete_reward(&self, id: &str) -> StoreResult<()>;
}
