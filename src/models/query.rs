//! Query parameters for the list and analytics reads.
//!
//! Every param type has a `normalized()` form: defaults applied, page size
//! clamped, free text trimmed. Cache keys and store queries are both built
//! from the normalized form, so two requests that mean the same thing share
//! one cache entry.

use super::goal::{GoalSortField, GoalStatus};
use super::pagination::{effective_limit, effective_page, SortOrder};
use super::subtask::SubtaskSortField;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn normalize_search(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<GoalStatus>,
    pub search: Option<String>,
    pub due_after: Option<DateTime<Utc>>,
    pub due_before: Option<DateTime<Utc>>,
    pub sort_by: Option<GoalSortField>,
    pub sort_order: Option<SortOrder>,
}

impl GoalListParams {
    pub fn normalized(&self) -> Self {
        Self {
            page: Some(effective_page(self.page)),
            limit: Some(effective_limit(self.limit)),
            status: self.status,
            search: normalize_search(&self.search),
            due_after: self.due_after,
            due_before: self.due_before,
            sort_by: Some(self.sort_by.unwrap_or_default()),
            sort_order: Some(self.sort_order.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtaskListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub completed: Option<bool>,
    pub search: Option<String>,
    pub sort_by: Option<SubtaskSortField>,
    pub sort_order: Option<SortOrder>,
}

impl SubtaskListParams {
    pub fn normalized(&self) -> Self {
        Self {
            page: Some(effective_page(self.page)),
            limit: Some(effective_limit(self.limit)),
            completed: self.completed,
            search: normalize_search(&self.search),
            sort_by: Some(self.sort_by.unwrap_or_default()),
            sort_order: Some(self.sort_order.unwrap_or_default()),
        }
    }
}

/// Rewards are always sorted by creation time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub claimed: Option<bool>,
    pub search: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl RewardListParams {
    pub fn normalized(&self) -> Self {
        Self {
            page: Some(effective_page(self.page)),
            limit: Some(effective_limit(self.limit)),
            claimed: self.claimed,
            search: normalize_search(&self.search),
            sort_order: Some(self.sort_order.unwrap_or_default()),
        }
    }
}

/// Optional created-at window for the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DashboardParams {
    pub fn normalized(&self) -> Self {
        self.clone()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}
