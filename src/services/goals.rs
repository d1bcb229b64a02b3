use super::{new_id, validate_title};
use crate::cache::keys::{goal_key, goals_list_key, reward_key, subtask_key};
use crate::cache::{CacheLayer, Cached};
use crate::constants::round_two_decimals;
use crate::error::{GoaltrackError, Result};
use crate::logging::log_write_operation;
use crate::models::{
    Goal, GoalListParams, GoalStatus, GoalUpdate, NewGoal, Page, Reward, Subtask,
};
use crate::store::DocumentStore;
use chrono::Utc;
use std::sync::Arc;

/// Goal progress derived from its subtasks
///
/// The mean of subtask progress, rounded to two decimals. A goal without
/// subtasks is at 100 when completed and 0 otherwise.
pub fn compute_goal_progress(status: GoalStatus, subtasks: &[Subtask]) -> f64 {
    if subtasks.is_empty() {
        return if status == GoalStatus::Completed {
            100.0
        } else {
            0.0
        };
    }
    let total: f64 = subtasks.iter().map(|s| s.progress).sum();
    round_two_decimals(total / subtasks.len() as f64)
}

#[derive(Debug, Clone)]
pub struct GoalService {
    store: Arc<dyn DocumentStore>,
    cache: CacheLayer,
}

impl GoalService {
    pub fn new(store: Arc<dyn DocumentStore>, cache: CacheLayer) -> Self {
        Self { store, cache }
    }

    pub async fn list(&self, user_id: &str, params: &GoalListParams) -> Result<Cached<Page<Goal>>> {
        let key = goals_list_key(user_id, params);
        self.cache
            .read_through(&key, self.cache.ttl().goals_list(), Some(user_id), || async {
                Ok(self.store.find_goals(user_id, params).await?)
            })
            .await
    }

    pub async fn get(&self, user_id: &str, goal_id: &str) -> Result<Cached<Goal>> {
        let cached = self
            .cache
            .read_through(&goal_key(goal_id), self.cache.ttl().goal(), None, || async {
                self.store
                    .find_goal(goal_id)
                    .await?
                    .ok_or_else(|| GoaltrackError::not_found("goal", goal_id))
            })
            .await?;
        if cached.value.user_id != user_id {
            return Err(GoaltrackError::not_found("goal", goal_id));
        }
        Ok(cached)
    }

    pub async fn create(&self, user_id: &str, input: NewGoal) -> Result<Goal> {
        let title = validate_title("title", &input.title)?;
        let now = Utc::now();
        let goal = self
            .store
            .create_goal(Goal {
                id: new_id(),
                user_id: user_id.to_string(),
                title,
                description: input.description,
                status: GoalStatus::Active,
                progress: 0.0,
                due_date: input.due_date,
                reward_id: None,
                created_at: now,
                updated_at: now,
            })
            .await?;

        log_write_operation("goal", "create", &goal.id, user_id);
        self.cache.invalidate(user_id, &[goal_key(&goal.id)]).await;
        Ok(goal)
    }

    pub async fn update(&self, user_id: &str, goal_id: &str, update: GoalUpdate) -> Result<Goal> {
        let mut goal = self.owned_goal(user_id, goal_id).await?;

        if let Some(title) = update.title {
            goal.title = validate_title("title", &title)?;
        }
        if let Some(description) = update.description {
            goal.description = Some(description);
        }
        if let Some(due_date) = update.due_date {
            goal.due_date = Some(due_date);
        }
        if let Some(status) = update.status {
            goal.status = status;
        }

        let subtasks = self.store.subtasks_for_goal(goal_id).await?;
        goal.progress = compute_goal_progress(goal.status, &subtasks);
        goal.updated_at = Utc::now();
        let goal = self.store.update_goal(goal).await?;

        log_write_operation("goal", "update", goal_id, user_id);
        self.cache.invalidate(user_id, &[goal_key(goal_id)]).await;
        Ok(goal)
    }

    /// Delete a goal together with its subtasks; linked rewards are unlinked
    pub async fn delete(&self, user_id: &str, goal_id: &str) -> Result<()> {
        let goal = self.owned_goal(user_id, goal_id).await?;

        let mut keys = vec![goal_key(goal_id)];
        let removed = self.store.delete_subtasks_for_goal(goal_id).await?;
        keys.extend(removed.iter().map(|id| subtask_key(id)));

        let linked: Vec<Reward> = self
            .store
            .rewards_for_user(user_id)
            .await?
            .into_iter()
            .filter(|r| r.goal_id.as_deref() == Some(goal_id))
            .collect();
        for mut reward in linked {
            keys.push(reward_key(&reward.id));
            reward.goal_id = None;
            reward.updated_at = Utc::now();
            self.store.update_reward(reward).await?;
        }

        self.store.delete_goal(&goal.id).await?;

        log_write_operation("goal", "delete", goal_id, user_id);
        self.cache.invalidate(user_id, &keys).await;
        Ok(())
    }

    /// Link a reward to a goal, replacing any previous links on either side
    pub async fn attach_reward(&self, user_id: &str, goal_id: &str, reward_id: &str) -> Result<Goal> {
        let mut goal = self.owned_goal(user_id, goal_id).await?;
        let mut reward = self.owned_reward(user_id, reward_id).await?;
        if reward.claimed {
            return Err(GoaltrackError::Conflict(format!(
                "reward {reward_id} has already been claimed"
            )));
        }

        let mut keys = vec![goal_key(goal_id), reward_key(reward_id)];
        let now = Utc::now();

        if let Some(previous_reward) = goal.reward_id.clone().filter(|id| id != reward_id) {
            if let Some(mut old) = self.store.find_reward(&previous_reward).await? {
                old.goal_id = None;
                old.updated_at = now;
                self.store.update_reward(old).await?;
            }
            keys.push(reward_key(&previous_reward));
        }

        if let Some(previous_goal) = reward.goal_id.clone().filter(|id| id != goal_id) {
            if let Some(mut old) = self.store.find_goal(&previous_goal).await? {
                old.reward_id = None;
                old.updated_at = now;
                self.store.update_goal(old).await?;
            }
            keys.push(goal_key(&previous_goal));
        }

        reward.goal_id = Some(goal_id.to_string());
        reward.updated_at = now;
        self.store.update_reward(reward).await?;

        goal.reward_id = Some(reward_id.to_string());
        goal.updated_at = now;
        let goal = self.store.update_goal(goal).await?;

        log_write_operation("goal", "attach_reward", goal_id, user_id);
        self.cache.invalidate(user_id, &keys).await;
        Ok(goal)
    }

    /// Unlink the goal's reward; a goal without one is returned unchanged
    pub async fn detach_reward(&self, user_id: &str, goal_id: &str) -> Result<Goal> {
        let mut goal = self.owned_goal(user_id, goal_id).await?;
        let Some(reward_id) = goal.reward_id.take() else {
            return Ok(goal);
        };

        let now = Utc::now();
        if let Some(mut reward) = self.store.find_reward(&reward_id).await? {
            reward.goal_id = None;
            reward.updated_at = now;
            self.store.update_reward(reward).await?;
        }
        goal.updated_at = now;
        let goal = self.store.update_goal(goal).await?;

        log_write_operation("goal", "detach_reward", goal_id, user_id);
        self.cache
            .invalidate(user_id, &[goal_key(goal_id), reward_key(&reward_id)])
            .await;
        Ok(goal)
    }

    /// Recalculate a goal's progress from its subtasks and store it
    ///
    /// Does not invalidate; the calling write does that once for all keys.
    pub(crate) async fn recompute_progress(&self, goal_id: &str) -> Result<Goal> {
        let mut goal = self
            .store
            .find_goal(goal_id)
            .await?
            .ok_or_else(|| GoaltrackError::not_found("goal", goal_id))?;
        let subtasks = self.store.subtasks_for_goal(goal_id).await?;
        goal.progress = compute_goal_progress(goal.status, &subtasks);
        goal.updated_at = Utc::now();
        Ok(self.store.update_goal(goal).await?)
    }

    /// Load a goal for writing, straight from the store
    pub(crate) async fn owned_goal(&self, user_id: &str, goal_id: &str) -> Result<Goal> {
        match self.store.find_goal(goal_id).await? {
            Some(goal) if goal.user_id == user_id => Ok(goal),
            _ => Err(GoaltrackError::not_found("goal", goal_id)),
        }
    }

    async fn owned_reward(&self, user_id: &str, reward_id: &str) -> Result<Reward> {
        match self.store.find_reward(reward_id).await? {
            Some(reward) if reward.user_id == user_id => Ok(reward),
            _ => Err(GoaltrackError::not_found("reward", reward_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::providers::FailureMode;
    use crate::cache::CacheStatus;
    use crate::models::NewReward;
    use crate::services::test_support::{failing_services, memory_services};
    use crate::store::StoreError;

    fn subtask(progress: f64) -> Subtask {
        let now = Utc::now();
        Subtask {
            id: new_id(),
            goal_id: "g".into(),
            user_id: "u".into(),
            title: "s".into(),
            progress,
            completed: progress >= 100.0,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn new_goal(title: &str) -> NewGoal {
        NewGoal {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_compute_goal_progress() {
        assert_eq!(compute_goal_progress(GoalStatus::Active, &[]), 0.0);
        assert_eq!(compute_goal_progress(GoalStatus::Completed, &[]), 100.0);
        let thirds = [subtask(100.0), subtask(0.0), subtask(0.0)];
        assert_eq!(compute_goal_progress(GoalStatus::Active, &thirds), 33.33);
        let two_thirds = [subtask(100.0), subtask(100.0), subtask(0.0)];
        assert_eq!(compute_goal_progress(GoalStatus::Active, &two_thirds), 66.67);
    }

    #[tokio::test]
    async fn test_get_is_read_through_and_owner_scoped() {
        let (services, store, _) = memory_services();
        let goal = services.goals.create("u1", new_goal("Run")).await.unwrap();
        store.reset_stats();

        let first = services.goals.get("u1", &goal.id).await.unwrap();
        let second = services.goals.get("u1", &goal.id).await.unwrap();
        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(store.stats().reads(), 1);

        let err = services.goals.get("u2", &goal.id).await.unwrap_err();
        assert!(matches!(err, GoaltrackError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_replaces_cached_goal() {
        let (services, _, _) = memory_services();
        let goal = services.goals.create("u1", new_goal("Run")).await.unwrap();
        services.goals.get("u1", &goal.id).await.unwrap();

        let update = GoalUpdate {
            title: Some("Run faster".into()),
            ..Default::default()
        };
        services.goals.update("u1", &goal.id, update).await.unwrap();

        let fetched = services.goals.get("u1", &goal.id).await.unwrap();
        assert_eq!(fetched.status, CacheStatus::Miss);
        assert_eq!(fetched.value.title, "Run faster");
    }

    #[tokio::test]
    async fn test_completing_goal_without_subtasks_sets_full_progress() {
        let (services, _, _) = memory_services();
        let goal = services.goals.create("u1", new_goal("Run")).await.unwrap();
        let update = GoalUpdate {
            status: Some(GoalStatus::Completed),
            ..Default::default()
        };
        let goal = services.goals.update("u1", &goal.id, update).await.unwrap();
        assert_eq!(goal.progress, 100.0);
    }

    #[tokio::test]
    async fn test_validation_and_foreign_writes() {
        let (services, _, _) = memory_services();
        assert!(matches!(
            services.goals.create("u1", new_goal("  ")).await,
            Err(GoaltrackError::Validation(_))
        ));

        let goal = services.goals.create("u1", new_goal("Run")).await.unwrap();
        assert!(matches!(
            services.goals.delete("u2", &goal.id).await,
            Err(GoaltrackError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_attach_and_detach_reward() {
        let (services, _, _) = memory_services();
        let first = services.goals.create("u1", new_goal("Run")).await.unwrap();
        let second = services.goals.create("u1", new_goal("Swim")).await.unwrap();
        let reward = services
            .rewards
            .create("u1", NewReward { title: "Cake".into(), description: None })
            .await
            .unwrap();

        let linked = services.goals.attach_reward("u1", &first.id, &reward.id).await.unwrap();
        assert_eq!(linked.reward_id.as_deref(), Some(reward.id.as_str()));

        // Moving the reward unlinks it from the first goal
        services.goals.attach_reward("u1", &second.id, &reward.id).await.unwrap();
        let first = services.goals.get("u1", &first.id).await.unwrap().value;
        assert_eq!(first.reward_id, None);
        let reward_now = services.rewards.get("u1", &reward.id).await.unwrap().value;
        assert_eq!(reward_now.goal_id.as_deref(), Some(second.id.as_str()));

        let detached = services.goals.detach_reward("u1", &second.id).await.unwrap();
        assert_eq!(detached.reward_id, None);
        let reward_now = services.rewards.get("u1", &reward.id).await.unwrap().value;
        assert_eq!(reward_now.goal_id, None);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_subtasks_and_rewards() {
        let (services, _, _) = memory_services();
        let goal = services.goals.create("u1", new_goal("Run")).await.unwrap();
        let subtask = services
            .subtasks
            .create("u1", &goal.id, crate::models::NewSubtask { title: "Warm up".into(), ..Default::default() })
            .await
            .unwrap();
        let reward = services
            .rewards
            .create("u1", NewReward { title: "Cake".into(), description: None })
            .await
            .unwrap();
        services.goals.attach_reward("u1", &goal.id, &reward.id).await.unwrap();

        services.goals.delete("u1", &goal.id).await.unwrap();

        assert!(services.goals.get("u1", &goal.id).await.is_err());
        assert!(services.subtasks.get("u1", &subtask.id).await.is_err());
        let reward = services.rewards.get("u1", &reward.id).await.unwrap().value;
        assert_eq!(reward.goal_id, None);
    }

    #[tokio::test]
    async fn test_failing_cache_does_not_affect_results() {
        for mode in [FailureMode::Error, FailureMode::Garbage] {
            let (services, _) = failing_services(mode);
            let goal = services.goals.create("u1", new_goal("Run")).await.unwrap();
            let page = services
                .goals
                .list("u1", &GoalListParams::default())
                .await
                .unwrap();
            assert_eq!(page.value.items, vec![goal.clone()]);
            assert_eq!(page.status, CacheStatus::Miss);

            let update = GoalUpdate {
                title: Some("Walk".into()),
                ..Default::default()
            };
            services.goals.update("u1", &goal.id, update).await.unwrap();
            assert_eq!(services.goals.get("u1", &goal.id).await.unwrap().value.title, "Walk");
        }
    }

    #[tokio::test]
    async fn test_store_errors_propagate_unchanged() {
        let (services, store, _) = memory_services();
        store.set_unavailable(true);
        let err = services
            .goals
            .list("u1", &GoalListParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GoaltrackError::Store(StoreError::Unavailable(_))));
    }
}
