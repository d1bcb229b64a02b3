use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user dashboard aggregates over an optional created-at window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardAnalytics {
    pub user_id: String,
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    pub total_goals: u64,
    pub active_goals: u64,
    pub completed_goals: u64,
    pub archived_goals: u64,
    pub overdue_goals: u64,
    /// Completed goals as a percentage of all goals, two decimals
    pub completion_rate: f64,
    /// Mean goal progress, two decimals
    pub average_progress: f64,
    pub total_subtasks: u64,
    pub completed_subtasks: u64,
    pub total_rewards: u64,
    pub claimed_rewards: u64,
    pub generated_at: DateTime<Utc>,
}
