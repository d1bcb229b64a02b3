//! In-process document store.
//!
//! Backs the server binary and the test suites. Every trait call bumps a
//! counter in [`StoreStats`], which is how read-through behaviour is observed
//! from the outside.

use super::{DocumentStore, StoreError, StoreResult};
use crate::models::{
    Goal, GoalListParams, GoalSortField, Page, Reward, RewardListParams, Subtask,
    SubtaskListParams, SubtaskSortField, User,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Per-operation counters
#[derive(Debug, Default)]
pub struct StoreStats {
    creates: AtomicU64,
    finds: AtomicU64,
    queries: AtomicU64,
    updates: AtomicU64,
    deletes: AtomicU64,
    counts: AtomicU64,
}

/// Point-in-time copy of [`StoreStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStatsSnapshot {
    pub creates: u64,
    pub finds: u64,
    pub queries: u64,
    pub updates: u64,
    pub deletes: u64,
    pub counts: u64,
}

impl StoreStatsSnapshot {
    /// Calls that read documents (by id, paged queries, counts)
    pub fn reads(&self) -> u64 {
        self.finds + self.queries + self.counts
    }

    pub fn writes(&self) -> u64 {
        self.creates + self.updates + self.deletes
    }
}

impl StoreStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, AtomicOrdering::Relaxed);
    }

    pub fn snapshot(&self) -> StoreStatsSnapshot {
        StoreStatsSnapshot {
            creates: self.creates.load(AtomicOrdering::Relaxed),
            finds: self.finds.load(AtomicOrdering::Relaxed),
            queries: self.queries.load(AtomicOrdering::Relaxed),
            updates: self.updates.load(AtomicOrdering::Relaxed),
            deletes: self.deletes.load(AtomicOrdering::Relaxed),
            counts: self.counts.load(AtomicOrdering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.creates,
            &self.finds,
            &self.queries,
            &self.updates,
            &self.deletes,
            &self.counts,
        ] {
            counter.store(0, AtomicOrdering::Relaxed);
        }
    }
}

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<String, User>,
    goals: HashMap<String, Goal>,
    subtasks: HashMap<String, Subtask>,
    rewards: HashMap<String, Reward>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    data: Arc<RwLock<Collections>>,
    stats: Arc<StoreStats>,
    unavailable: Arc<AtomicBool>,
}

fn text_matches(search: Option<&str>, fields: &[Option<&str>]) -> bool {
    let Some(needle) = search else {
        return true;
    };
    let needle = needle.to_lowercase();
    fields
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> StoreStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store switched off".to_string(),
            ));
        }
        Ok(())
    }

    fn begin(&self, counter: &AtomicU64) -> StoreResult<()> {
        self.check_available()?;
        StoreStats::bump(counter);
        Ok(())
    }

    fn not_found(collection: &'static str, id: &str) -> StoreError {
        StoreError::NotFound {
            collection,
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        self.begin(&self.stats.creates)?;
        let mut data = self.data.write();
        if data
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict {
                collection: "users",
                message: format!("email {} already registered", user.email),
            });
        }
        data.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        self.begin(&self.stats.finds)?;
        Ok(self.data.read().users.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.begin(&self.stats.finds)?;
        Ok(self
            .data
            .read()
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        self.begin(&self.stats.updates)?;
        let mut data = self.data.write();
        if data
            .users
            .values()
            .any(|other| other.id != user.id && other.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict {
                collection: "users",
                message: format!("email {} already registered", user.email),
            });
        }
        match data.users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(user)
            }
            None => Err(Self::not_found("users", &user.id)),
        }
    }

    async fn create_goal(&self, goal: Goal) -> StoreResult<Goal> {
        self.begin(&self.stats.creates)?;
        self.data.write().goals.insert(goal.id.clone(), goal.clone());
        Ok(goal)
    }

    async fn find_goal(&self, id: &str) -> StoreResult<Option<Goal>> {
        self.begin(&self.stats.finds)?;
        Ok(self.data.read().goals.get(id).cloned())
    }

    async fn find_goals(&self, user_id: &str, params: &GoalListParams) -> StoreResult<Page<Goal>> {
        self.begin(&self.stats.queries)?;
        let params = params.normalized();
        let mut matching: Vec<Goal> = self
            .data
            .read()
            .goals
            .values()
            .filter(|goal| goal.user_id == user_id)
            .filter(|goal| params.status.is_none_or(|status| goal.status == status))
            .filter(|goal| {
                text_matches(
                    params.search.as_deref(),
                    &[Some(goal.title.as_str()), goal.description.as_deref()],
                )
            })
            .filter(|goal| {
                params
                    .due_after
                    .is_none_or(|after| goal.due_date.is_some_and(|due| due >= after))
            })
            .filter(|goal| {
                params
                    .due_before
                    .is_none_or(|before| goal.due_date.is_some_and(|due| due <= before))
            })
            .cloned()
            .collect();

        let field = params.sort_by.unwrap_or_default();
        let order = params.sort_order.unwrap_or_default();
        matching.sort_by(|a, b| {
            let primary = match field {
                GoalSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                GoalSortField::DueDate => a.due_date.cmp(&b.due_date),
                GoalSortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                GoalSortField::Progress => cmp_f64(a.progress, b.progress),
            };
            order.apply(primary.then_with(|| a.id.cmp(&b.id)))
        });

        Ok(Page::from_sorted(
            matching,
            params.page.unwrap_or(1),
            params.limit.unwrap_or(10),
        ))
    }

    async fn goals_for_user(&self, user_id: &str) -> StoreResult<Vec<Goal>> {
        self.begin(&self.stats.queries)?;
        Ok(self
            .data
            .read()
            .goals
            .values()
            .filter(|goal| goal.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_goal(&self, goal: Goal) -> StoreResult<Goal> {
        self.begin(&self.stats.updates)?;
        match self.data.write().goals.get_mut(&goal.id) {
            Some(slot) => {
                *slot = goal.clone();
                Ok(goal)
            }
            None => Err(Self::not_found("goals", &goal.id)),
        }
    }

    async fn delete_goal(&self, id: &str) -> StoreResult<()> {
        self.begin(&self.stats.deletes)?;
        self.data
            .write()
            .goals
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found("goals", id))
    }

    async fn count_goals(&self, user_id: &str) -> StoreResult<u64> {
        self.begin(&self.stats.counts)?;
        Ok(self
            .data
            .read()
            .goals
            .values()
            .filter(|goal| goal.user_id == user_id)
            .count() as u64)
    }

    async fn create_subtask(&self, subtask: Subtask) -> StoreResult<Subtask> {
        self.begin(&self.stats.creates)?;
        self.data
            .write()
            .subtasks
            .insert(subtask.id.clone(), subtask.clone());
        Ok(subtask)
    }

    async fn find_subtask(&self, id: &str) -> StoreResult<Option<Subtask>> {
        self.begin(&self.stats.finds)?;
        Ok(self.data.read().subtasks.get(id).cloned())
    }

    async fn find_subtasks(
        &self,
        goal_id: &str,
        params: &SubtaskListParams,
    ) -> StoreResult<Page<Subtask>> {
        self.begin(&self.stats.queries)?;
        let params = params.normalized();
        let mut matching: Vec<Subtask> = self
            .data
            .read()
            .subtasks
            .values()
            .filter(|subtask| subtask.goal_id == goal_id)
            .filter(|subtask| params.completed.is_none_or(|c| subtask.completed == c))
            .filter(|subtask| text_matches(params.search.as_deref(), &[Some(subtask.title.as_str())]))
            .cloned()
            .collect();

        let field = params.sort_by.unwrap_or_default();
        let order = params.sort_order.unwrap_or_default();
        matching.sort_by(|a, b| {
            let primary = match field {
                SubtaskSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SubtaskSortField::DueDate => a.due_date.cmp(&b.due_date),
                SubtaskSortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                SubtaskSortField::Progress => cmp_f64(a.progress, b.progress),
            };
            order.apply(primary.then_with(|| a.id.cmp(&b.id)))
        });

        Ok(Page::from_sorted(
            matching,
            params.page.unwrap_or(1),
            params.limit.unwrap_or(10),
        ))
    }

    async fn subtasks_for_goal(&self, goal_id: &str) -> StoreResult<Vec<Subtask>> {
        self.begin(&self.stats.queries)?;
        let mut subtasks: Vec<Subtask> = self
            .data
            .read()
            .subtasks
            .values()
            .filter(|subtask| subtask.goal_id == goal_id)
            .cloned()
            .collect();
        subtasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(subtasks)
    }

    async fn subtasks_for_user(&self, user_id: &str) -> StoreResult<Vec<Subtask>> {
        self.begin(&self.stats.queries)?;
        Ok(self
            .data
            .read()
            .subtasks
            .values()
            .filter(|subtask| subtask.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_subtask(&self, subtask: Subtask) -> StoreResult<Subtask> {
        self.begin(&self.stats.updates)?;
        match self.data.write().subtasks.get_mut(&subtask.id) {
            Some(slot) => {
                *slot = subtask.clone();
                Ok(subtask)
            }
            None => Err(Self::not_found("subtasks", &subtask.id)),
        }
    }

    async fn delete_subtask(&self, id: &str) -> StoreResult<()> {
        self.begin(&self.stats.deletes)?;
        self.data
            .write()
            .subtasks
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found("subtasks", id))
    }

    async fn delete_subtasks_for_goal(&self, goal_id: &str) -> StoreResult<Vec<String>> {
        self.begin(&self.stats.deletes)?;
        let mut data = self.data.write();
        let ids: Vec<String> = data
            .subtasks
            .values()
            .filter(|subtask| subtask.goal_id == goal_id)
            .map(|subtask| subtask.id.clone())
            .collect();
        for id in &ids {
            data.subtasks.remove(id);
        }
        Ok(ids)
    }

    async fn create_reward(&self, reward: Reward) -> StoreResult<Reward> {
        self.begin(&self.stats.creates)?;
        self.data
            .write()
            .rewards
            .insert(reward.id.clone(), reward.clone());
        Ok(reward)
    }

    async fn find_reward(&self, id: &str) -> StoreResult<Option<Reward>> {
        self.begin(&self.stats.finds)?;
        Ok(self.data.read().rewards.get(id).cloned())
    }

    async fn find_rewards(
        &self,
        user_id: &str,
        params: &RewardListParams,
    ) -> StoreResult<Page<Reward>> {
        self.begin(&self.stats.queries)?;
        let params = params.normalized();
        let mut matching: Vec<Reward> = self
            .data
            .read()
            .rewards
            .values()
            .filter(|reward| reward.user_id == user_id)
            .filter(|reward| params.claimed.is_none_or(|c| reward.claimed == c))
            .filter(|reward| {
                text_matches(
                    params.search.as_deref(),
                    &[Some(reward.title.as_str()), reward.description.as_deref()],
                )
            })
            .cloned()
            .collect();

        let order = params.sort_order.unwrap_or_default();
        matching.sort_by(|a, b| {
            order.apply(
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id)),
            )
        });

        Ok(Page::from_sorted(
            matching,
            params.page.unwrap_or(1),
            params.limit.unwrap_or(10),
        ))
    }

    async fn rewards_for_user(&self, user_id: &str) -> StoreResult<Vec<Reward>> {
        self.begin(&self.stats.queries)?;
        Ok(self
            .data
            .read()
            .rewards
            .values()
            .filter(|reward| reward.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_reward(&self, reward: Reward) -> StoreResult<Reward> {
        self.begin(&self.stats.updates)?;
        match self.data.write().rewards.get_mut(&reward.id) {
            Some(slot) => {
                *slot = reward.clone();
                Ok(reward)
            }
            None => Err(Self::not_found("rewards", &reward.id)),
        }
    }

    async fn delete_reward(&self, id: &str) -> StoreResult<()> {
        self.begin(&self.stats.deletes)?;
        self.data
            .write()
            .rewards
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found("rewards", id))
    }
}
