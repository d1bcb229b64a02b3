use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user's goal. `progress` is a percentage in `0.0..=100.0`, derived from
/// the goal's subtasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: GoalStatus,
    pub progress: f64,
    pub due_date: Option<DateTime<Utc>>,
    pub reward_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Past its due date without being completed
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == GoalStatus::Active && self.due_date.is_some_and(|due| due < now)
    }
}

/// New Goal for creation (without generated fields)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update of a goal; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<GoalStatus>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
    Archived,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(GoalStatus::Active),
            "completed" => Ok(GoalStatus::Completed),
            "archived" => Ok(GoalStatus::Archived),
            other => Err(format!("unknown goal status '{other}'")),
        }
    }
}

/// Fields goals lists can be sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalSortField {
    #[default]
    CreatedAt,
    DueDate,
    Title,
    Progress,
}

impl GoalSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalSortField::CreatedAt => "created_at",
            GoalSortField::DueDate => "due_date",
            GoalSortField::Title => "title",
            GoalSortField::Progress => "progress",
        }
    }
}

impl FromStr for GoalSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created_at" | "createdat" => Ok(GoalSortField::CreatedAt),
            "due_date" | "duedate" => Ok(GoalSortField::DueDate),
            "title" => Ok(GoalSortField::Title),
            "progress" => Ok(GoalSortField::Progress),
            other => Err(format!("unknown goal sort field '{other}'")),
        }
    }
}
