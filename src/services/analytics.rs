use crate::cache::keys::dashboard_key;
use crate::cache::{CacheLayer, Cached};
use crate::constants::round_two_decimals;
use crate::error::{GoaltrackError, Result};
use crate::models::{DashboardAnalytics, DashboardParams, Goal, GoalStatus, Reward, Subtask};
use crate::store::DocumentStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AnalyticsService {
    store: Arc<dyn DocumentStore>,
    cache: CacheLayer,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn DocumentStore>, cache: CacheLayer) -> Self {
        Self { store, cache }
    }

    /// Per-user aggregates over documents created inside the window
    pub async fn dashboard(
        &self,
        user_id: &str,
        params: &DashboardParams,
    ) -> Result<Cached<DashboardAnalytics>> {
        let params = params.normalized();
        if let (Some(from), Some(to)) = (params.from, params.to) {
            if from > to {
                return Err(GoaltrackError::validation(
                    "dashboard window 'from' must not be after 'to'",
                ));
            }
        }

        let key = dashboard_key(user_id, &params);
        self.cache
            .read_through(&key, self.cache.ttl().dashboard(), Some(user_id), || async {
                let goals = self.store.goals_for_user(user_id).await?;
                let subtasks = self.store.subtasks_for_user(user_id).await?;
                let rewards = self.store.rewards_for_user(user_id).await?;
                Ok(aggregate(
                    user_id,
                    &params,
                    &goals,
                    &subtasks,
                    &rewards,
                    Utc::now(),
                ))
            })
            .await
    }
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_two_decimals(part as f64 * 100.0 / whole as f64)
}

fn aggregate(
    user_id: &str,
    params: &DashboardParams,
    goals: &[Goal],
    subtasks: &[Subtask],
    rewards: &[Reward],
    now: DateTime<Utc>,
) -> DashboardAnalytics {
    let goals: Vec<&Goal> = goals.iter().filter(|g| params.contains(g.created_at)).collect();
    let subtasks: Vec<&Subtask> = subtasks
        .iter()
        .filter(|s| params.contains(s.created_at))
        .collect();
    let rewards: Vec<&Reward> = rewards
        .iter()
        .filter(|r| params.contains(r.created_at))
        .collect();

    let count_status =
        |status: GoalStatus| goals.iter().filter(|g| g.status == status).count() as u64;
    let total_goals = goals.len() as u64;
    let completed_goals = count_status(GoalStatus::Completed);
    let average_progress = if goals.is_empty() {
        0.0
    } else {
        round_two_decimals(goals.iter().map(|g| g.progress).sum::<f64>() / goals.len() as f64)
    };

    DashboardAnalytics {
        user_id: user_id.to_string(),
        window_start: params.from,
        window_end: params.to,
        total_goals,
        active_goals: count_status(GoalStatus::Active),
        completed_goals,
        archived_goals: count_status(GoalStatus::Archived),
        overdue_goals: goals.iter().filter(|g| g.is_overdue(now)).count() as u64,
        completion_rate: percentage(completed_goals, total_goals),
        average_progress,
        total_subtasks: subtasks.len() as u64,
        completed_subtasks: subtasks.iter().filter(|s| s.completed).count() as u64,
        total_rewards: rewards.len() as u64,
        claimed_rewards: rewards.iter().filter(|r| r.claimed).count() as u64,
        generated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStatus;
    use crate::models::{GoalUpdate, NewGoal, NewSubtask};
    use crate::services::test_support::memory_services;
    use chrono::Duration;

    #[tokio::test]
    async fn test_dashboard_aggregates_and_is_invalidated_by_writes() {
        let (services, _, _) = memory_services();
        let params = DashboardParams::default();
        let run = services
            .goals
            .create(
                "u1",
                NewGoal {
                    title: "Run".into(),
                    due_date: Some(Utc::now() - Duration::days(1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let read = services
            .goals
            .create("u1", NewGoal { title: "Read".into(), ..Default::default() })
            .await
            .unwrap();
        services
            .subtasks
            .create(
                "u1",
                &read.id,
                NewSubtask { title: "Ch 1".into(), progress: Some(50.0), due_date: None },
            )
            .await
            .unwrap();

        let first = services.analytics.dashboard("u1", &params).await.unwrap();
        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(first.value.total_goals, 2);
        assert_eq!(first.value.overdue_goals, 1);
        assert_eq!(first.value.average_progress, 25.0);
        assert_eq!(first.value.total_subtasks, 1);
        assert!(services.analytics.dashboard("u1", &params).await.unwrap().is_hit());

        services
            .goals
            .update(
                "u1",
                &run.id,
                GoalUpdate { status: Some(GoalStatus::Completed), ..Default::default() },
            )
            .await
            .unwrap();
        let after = services.analytics.dashboard("u1", &params).await.unwrap();
        assert_eq!(after.status, CacheStatus::Miss);
        assert_eq!(after.value.completed_goals, 1);
        assert_eq!(after.value.completion_rate, 50.0);
        assert_eq!(after.value.overdue_goals, 0);
    }

    #[tokio::test]
    async fn test_inverted_window_is_rejected() {
        let (services, _, _) = memory_services();
        let now = Utc::now();
        let params = DashboardParams {
            from: Some(now),
            to: Some(now - Duration::days(1)),
        };
        assert!(matches!(
            services.analytics.dashboard("u1", &params).await,
            Err(GoaltrackError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_dashboard() {
        let stats = aggregate("u1", &DashboardParams::default(), &[], &[], &[], Utc::now());
        assert_eq!(stats.total_goals, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.average_progress, 0.0);
    }
}
