use super::{new_id, validate_title};
use crate::cache::keys::{goal_key, reward_key, rewards_list_key};
use crate::cache::{CacheLayer, Cached};
use crate::error::{GoaltrackError, Result};
use crate::logging::log_write_operation;
use crate::models::{GoalStatus, NewReward, Page, Reward, RewardListParams, RewardUpdate};
use crate::store::DocumentStore;
use chrono::Utc;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RewardService {
    store: Arc<dyn DocumentStore>,
    cache: CacheLayer,
}

impl RewardService {
    pub fn new(store: Arc<dyn DocumentStore>, cache: CacheLayer) -> Self {
        Self { store, cache }
    }

    pub async fn list(
        &self,
        user_id: &str,
        params: &RewardListParams,
    ) -> Result<Cached<Page<Reward>>> {
        let key = rewards_list_key(user_id, params);
        self.cache
            .read_through(&key, self.cache.ttl().rewards_list(), Some(user_id), || async {
                Ok(self.store.find_rewards(user_id, params).await?)
            })
            .await
    }

    pub async fn get(&self, user_id: &str, reward_id: &str) -> Result<Cached<Reward>> {
        let cached = self
            .cache
            .read_through(&reward_key(reward_id), self.cache.ttl().reward(), None, || async {
                self.store
                    .find_reward(reward_id)
                    .await?
                    .ok_or_else(|| GoaltrackError::not_found("reward", reward_id))
            })
            .await?;
        if cached.value.user_id != user_id {
            return Err(GoaltrackError::not_found("reward", reward_id));
        }
        Ok(cached)
    }

    pub async fn create(&self, user_id: &str, input: NewReward) -> Result<Reward> {
        let title = validate_title("title", &input.title)?;
        let now = Utc::now();
        let reward = self
            .store
            .create_reward(Reward {
                id: new_id(),
                user_id: user_id.to_string(),
                title,
                description: input.description,
                goal_id: None,
                claimed: false,
                claimed_at: None,
                created_at: now,
                updated_at: now,
            })
            .await?;

        log_write_operation("reward", "create", &reward.id, user_id);
        self.cache.invalidate(user_id, &[reward_key(&reward.id)]).await;
        Ok(reward)
    }

    pub async fn update(
        &self,
        user_id: &str,
        reward_id: &str,
        update: RewardUpdate,
    ) -> Result<Reward> {
        let mut reward = self.owned_reward(user_id, reward_id).await?;
        if let Some(title) = update.title {
            reward.title = validate_title("title", &title)?;
        }
        if let Some(description) = update.description {
            reward.description = Some(description);
        }
        reward.updated_at = Utc::now();
        let reward = self.store.update_reward(reward).await?;

        log_write_operation("reward", "update", reward_id, user_id);
        self.cache.invalidate(user_id, &[reward_key(reward_id)]).await;
        Ok(reward)
    }

    /// Delete a reward, unlinking it from its goal first
    pub async fn delete(&self, user_id: &str, reward_id: &str) -> Result<()> {
        let reward = self.owned_reward(user_id, reward_id).await?;
        let mut keys = vec![reward_key(reward_id)];

        if let Some(goal_id) = &reward.goal_id {
            if let Some(mut goal) = self.store.find_goal(goal_id).await? {
                goal.reward_id = None;
                goal.updated_at = Utc::now();
                self.store.update_goal(goal).await?;
            }
            keys.push(goal_key(goal_id));
        }
        self.store.delete_reward(reward_id).await?;

        log_write_operation("reward", "delete", reward_id, user_id);
        self.cache.invalidate(user_id, &keys).await;
        Ok(())
    }

    /// Claim a reward
    ///
    /// A reward linked to a goal can only be claimed once that goal is
    /// completed. Unlinked rewards can be claimed at any time. Claiming twice
    /// is a conflict.
    pub async fn claim(&self, user_id: &str, reward_id: &str) -> Result<Reward> {
        let mut reward = self.owned_reward(user_id, reward_id).await?;
        if reward.claimed {
            return Err(GoaltrackError::Conflict(format!(
                "reward {reward_id} has already been claimed"
            )));
        }

        if let Some(goal_id) = &reward.goal_id {
            let goal = self
                .store
                .find_goal(goal_id)
                .await?
                .ok_or_else(|| GoaltrackError::not_found("goal", goal_id.as_str()))?;
            if goal.status != GoalStatus::Completed {
                return Err(GoaltrackError::Forbidden(format!(
                    "goal {goal_id} must be completed before its reward can be claimed"
                )));
            }
        }

        let now = Utc::now();
        reward.claimed = true;
        reward.claimed_at = Some(now);
        reward.updated_at = now;
        let reward = self.store.update_reward(reward).await?;

        log_write_operation("reward", "claim", reward_id, user_id);
        self.cache.invalidate(user_id, &[reward_key(reward_id)]).await;
        Ok(reward)
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
    use crate::cache::CacheStatus;
    use crate::models::{GoalUpdate, NewGoal};
    use crate::services::test_support::memory_services;

    fn cake() -> NewReward {
        NewReward {
            title: "Cake".into(),
            description: Some("Chocolate".into()),
        }
    }

    #[tokio::test]
    async fn test_claim_rules() {
        let (services, _, _) = memory_services();
        let goal = services
            .goals
            .create("u1", NewGoal { title: "Run".into(), ..Default::default() })
            .await
            .unwrap();
        let reward = services.rewards.create("u1", cake()).await.unwrap();
        services.goals.attach_reward("u1", &goal.id, &reward.id).await.unwrap();

        assert!(matches!(
            services.rewards.claim("u1", &reward.id).await,
            Err(GoaltrackError::Forbidden(_))
        ));

        services
            .goals
            .update(
                "u1",
                &goal.id,
                GoalUpdate {
                    status: Some(GoalStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let claimed = services.rewards.claim("u1", &reward.id).await.unwrap();
        assert!(claimed.claimed);
        assert!(claimed.claimed_at.is_some());

        assert!(matches!(
            services.rewards.claim("u1", &reward.id).await,
            Err(GoaltrackError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_unlinked_reward_can_be_claimed() {
        let (services, _, _) = memory_services();
        let reward = services.rewards.create("u1", cake()).await.unwrap();
        let cached = services.rewards.get("u1", &reward.id).await.unwrap();
        assert!(!cached.value.claimed);

        services.rewards.claim("u1", &reward.id).await.unwrap();
        let fetched = services.rewards.get("u1", &reward.id).await.unwrap();
        assert_eq!(fetched.status, CacheStatus::Miss);
        assert!(fetched.value.claimed);
    }

    #[tokio::test]
    async fn test_list_invalidated_by_update() {
        let (services, store, _) = memory_services();
        let reward = services.rewards.create("u1", cake()).await.unwrap();
        let params = RewardListParams::default();
        services.rewards.list("u1", &params).await.unwrap();
        assert!(services.rewards.list("u1", &params).await.unwrap().is_hit());

        services
            .rewards
            .update("u1", &reward.id, RewardUpdate { title: Some("Pie".into()), description: None })
            .await
            .unwrap();
        store.reset_stats();
        let page = services.rewards.list("u1", &params).await.unwrap();
        assert!(!page.is_hit());
        assert_eq!(page.value.items[0].title, "Pie");
        assert_eq!(store.stats().queries, 1);
    }

    #[tokio::test]
    async fn test_delete_unlinks_goal() {
        let (services, _, _) = memory_services();
        let goal = services
            .goals
            .create("u1", NewGoal { title: "Run".into(), ..Default::default() })
            .await
            .unwrap();
        let reward = services.rewards.create("u1", cake()).await.unwrap();
        services.goals.attach_reward("u1", &goal.id, &reward.id).await.unwrap();
        services.goals.get("u1", &goal.id).await.unwrap();

        services.rewards.delete("u1", &reward.id).await.unwrap();
        let goal = services.goals.get("u1", &goal.id).await.unwrap();
        assert_eq!(goal.value.reward_id, None);
        assert!(matches!(
            services.rewards.get("u1", &reward.id).await,
            Err(GoaltrackError::NotFound { .. })
        ));
        assert!(matches!(
            services.rewards.delete("u2", "nope").await,
            Err(GoaltrackError::NotFound { .. })
        ));
    }
}
