use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A step towards a goal. The parent goal's progress is the mean of its
/// subtasks' progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub goal_id: String,
    pub user_id: String,
    pub title: String,
    pub progress: f64,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New Subtask for creation (without generated fields)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSubtask {
    pub title: String,
    pub progress: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update of a subtask
///
/// Completing a subtask sets its progress to 100; reaching 100 progress
/// completes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubtaskUpdate {
    pub title: Option<String>,
    pub progress: Option<f64>,
    pub completed: Option<bool>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtaskSortField {
    #[default]
    CreatedAt,
    DueDate,
    Title,
    Progress,
}

impl SubtaskSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubtaskSortField::CreatedAt => "created_at",
            SubtaskSortField::DueDate => "due_date",
            SubtaskSortField::Title => "title",
            SubtaskSortField::Progress => "progress",
        }
    }
}

impl FromStr for SubtaskSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created_at" | "createdat" => Ok(SubtaskSortField::CreatedAt),
            "due_date" | "duedate" => Ok(SubtaskSortField::DueDate),
            "title" => Ok(SubtaskSortField::Title),
            "progress" => Ok(SubtaskSortField::Progress),
            other => Err(format!("unknown subtask sort field '{other}'")),
        }
    }
}
