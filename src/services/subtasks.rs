use super::goals::GoalService;
use super::{new_id, validate_progress, validate_title};
use crate::cache::keys::{goal_key, subtask_key, subtasks_list_key};
use crate::cache::{CacheLayer, Cached};
use crate::constants::progress;
use crate::error::{GoaltrackError, Result};
use crate::logging::log_write_operation;
use crate::models::{NewSubtask, Page, Subtask, SubtaskListParams, SubtaskUpdate};
use crate::store::DocumentStore;
use chrono::Utc;
use std::sync::Arc;

/// Subtask reads and writes
///
/// Every write recomputes the parent goal's progress before returning, so the
/// next read of the goal sees the new average.
#[derive(Debug, Clone)]
pub struct SubtaskService {
    store: Arc<dyn DocumentStore>,
    cache: CacheLayer,
    goals: GoalService,
}

impl SubtaskService {
    pub fn new(store: Arc<dyn DocumentStore>, cache: CacheLayer, goals: GoalService) -> Self {
        Self {
            store,
            cache,
            goals,
        }
    }

    pub async fn list(
        &self,
        user_id: &str,
        goal_id: &str,
        params: &SubtaskListParams,
    ) -> Result<Cached<Page<Subtask>>> {
        // Ownership through the cached goal, so a warm list costs no store call
        self.goals.get(user_id, goal_id).await?;

        let key = subtasks_list_key(goal_id, params);
        self.cache
            .read_through(&key, self.cache.ttl().subtasks_list(), Some(user_id), || async {
                Ok(self.store.find_subtasks(goal_id, params).await?)
            })
            .await
    }

    pub async fn get(&self, user_id: &str, subtask_id: &str) -> Result<Cached<Subtask>> {
        let cached = self
            .cache
            .read_through(
                &subtask_key(subtask_id),
                self.cache.ttl().subtask(),
                None,
                || async {
                    self.store
                        .find_subtask(subtask_id)
                        .await?
                        .ok_or_else(|| GoaltrackError::not_found("subtask", subtask_id))
                },
            )
            .await?;
        if cached.value.user_id != user_id {
            return Err(GoaltrackError::not_found("subtask", subtask_id));
        }
        Ok(cached)
    }

    pub async fn create(&self, user_id: &str, goal_id: &str, input: NewSubtask) -> Result<Subtask> {
        let goal = self.goals.owned_goal(user_id, goal_id).await?;
        let title = validate_title("title", &input.title)?;
        let progress = validate_progress(input.progress.unwrap_or(progress::MIN))?;

        let now = Utc::now();
        let subtask = self
            .store
            .create_subtask(Subtask {
                id: new_id(),
                goal_id: goal.id.clone(),
                user_id: user_id.to_string(),
                title,
                progress,
                completed: progress >= progress::MAX,
                due_date: input.due_date,
                created_at: now,
                updated_at: now,
            })
            .await?;

        self.after_write("create", user_id, &subtask).await?;
        Ok(subtask)
    }

    /// Apply a partial update
    ///
    /// `completed: true` sets progress to 100. `completed: false` on a
    /// subtask at 100 resets its progress to 0 unless a new progress is
    /// given. A progress of 100 marks the subtask completed.
    pub async fn update(
        &self,
        user_id: &str,
        subtask_id: &str,
        update: SubtaskUpdate,
    ) -> Result<Subtask> {
        let mut subtask = self.owned_subtask(user_id, subtask_id).await?;

        if let Some(title) = update.title {
            subtask.title = validate_title("title", &title)?;
        }
        if let Some(due_date) = update.due_date {
            subtask.due_date = Some(due_date);
        }
        if let Some(value) = update.progress {
            subtask.progress = validate_progress(value)?;
        }
        match update.completed {
            Some(true) => subtask.progress = progress::MAX,
            Some(false) => {
                if update.progress.is_some_and(|p| p >= progress::MAX) {
                    return Err(GoaltrackError::validation(
                        "an incomplete subtask cannot have 100 progress",
                    ));
                }
                if update.progress.is_none() && subtask.progress >= progress::MAX {
                    subtask.progress = progress::MIN;
                }
            }
            None => {}
        }
        subtask.completed = subtask.progress >= progress::MAX;
        subtask.updated_at = Utc::now();

        let subtask = self.store.update_subtask(subtask).await?;
        self.after_write("update", user_id, &subtask).await?;
        Ok(subtask)
    }

    pub async fn delete(&self, user_id: &str, subtask_id: &str) -> Result<()> {
        let subtask = self.owned_subtask(user_id, subtask_id).await?;
        self.store.delete_subtask(subtask_id).await?;
        self.after_write("delete", user_id, &subtask).await
    }

    /// Recompute the parent goal, then invalidate the subtask, the goal and
    /// the user's registry
    async fn after_write(&self, operation: &str, user_id: &str, subtask: &Subtask) -> Result<()> {
        let goal = self.goals.recompute_progress(&subtask.goal_id).await?;
        log_write_operation("subtask", operation, &subtask.id, user_id);
        tracing::debug!(
            goal_id = %goal.id,
            progress = goal.progress,
            "Goal progress recomputed"
        );
        self.cache
            .invalidate(user_id, &[subtask_key(&subtask.id), goal_key(&goal.id)])
            .await;
        Ok(())
    }

    async fn owned_subtask(&self, user_id: &str, subtask_id: &str) -> Result<Subtask> {
        match self.store.find_subtask(subtask_id).await? {
            Some(subtask) if subtask.user_id == user_id => Ok(subtask),
            _ => Err(GoaltrackError::not_found("subtask", subtask_id)),
        }
    }
}
