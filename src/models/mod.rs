//! Domain documents owned by the store and cached as JSON.

pub mod analytics;
pub mod goal;
pub mod pagination;
pub mod query;
pub mod reward;
pub mod subtask;
pub mod user;

pub use analytics::DashboardAnalytics;
pub use goal::{Goal, GoalSortField, GoalStatus, GoalUpdate, NewGoal};
pub use pagination::{Page, SortOrder};
pub use query::{DashboardParams, GoalListParams, RewardListParams, SubtaskListParams};
pub use reward::{NewReward, Reward, RewardUpdate};
pub use subtask::{NewSubtask, Subtask, SubtaskSortField, SubtaskUpdate};
pub use user::{NewUser, ProfileUpdate, User, UserProfile};
