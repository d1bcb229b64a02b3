//! Cache key derivation
//!
//! Pure functions from entity ids and query params to logical keys:
//!
//! ```text
//! goal:{id}                         single entity
//! goals:user:{userId}:{canonical}   collection scoped to a user
//! user_keys:{userId}                per-user registry set
//! ```
//!
//! The canonical params string lists every recognised parameter of the
//! normalized query as `name=value`, sorted by name and joined with `&`.
//! Absent optional parameters are written as `_`. Ids and values are
//! percent-encoded, so separators inside user input cannot make two
//! different queries collide.

use crate::constants::keys::{
    ABSENT, DASHBOARD, GOAL, GOALS_LIST, REWARD, REWARDS_LIST, SUBTASK, SUBTASKS_LIST, USER,
    USER_KEYS,
};
use crate::models::{DashboardParams, GoalListParams, RewardListParams, SubtaskListParams};
use chrono::{DateTime, SecondsFormat, Utc};

/// Query types that can be folded into a canonical key segment
pub trait KeyParams {
    /// Every recognised parameter with its effective value
    ///
    /// Implementations normalize first, so logically equivalent queries
    /// produce identical pairs.
    fn key_pairs(&self) -> Vec<(&'static str, Option<String>)>;
}

fn opt<T: ToString>(value: Option<T>) -> Option<String> {
    value.map(|v| v.to_string())
}

fn opt_date(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|d| d.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Present values never encode to the absent marker
fn encode_value(value: Option<&str>) -> String {
    match value {
        None => ABSENT.to_string(),
        Some(v) if v == ABSENT => "%5F".to_string(),
        Some(v) => encode(v),
    }
}

/// Canonical `k=v&k=v` form of a query, sorted by parameter name
pub fn canonical_params<P: KeyParams + ?Sized>(params: &P) -> String {
    let mut pairs = params.key_pairs();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs
        .iter()
        .map(|(name, value)| format!("{name}={}", encode_value(value.as_deref())))
        .collect::<Vec<_>>()
        .join("&")
}

impl KeyParams for GoalListParams {
    fn key_pairs(&self) -> Vec<(&'static str, Option<String>)> {
        let p = self.normalized();
        vec![
            ("page", opt(p.page)),
            ("limit", opt(p.limit)),
            ("status", opt(p.status)),
            ("search", opt(p.search)),
            ("due_after", opt_date(p.due_after)),
            ("due_before", opt_date(p.due_before)),
            ("sort_by", opt(p.sort_by.map(|s| s.as_str()))),
            ("sort_order", opt(p.sort_order)),
        ]
    }
}

impl KeyParams for SubtaskListParams {
    fn key_pairs(&self) -> Vec<(&'static str, Option<String>)> {
        let p = self.normalized();
        vec![
            ("page", opt(p.page)),
            ("limit", opt(p.limit)),
            ("completed", opt(p.completed)),
            ("search", opt(p.search)),
            ("sort_by", opt(p.sort_by.map(|s| s.as_str()))),
            ("sort_order", opt(p.sort_order)),
        ]
    }
}

impl KeyParams for RewardListParams {
    fn key_pairs(&self) -> Vec<(&'static str, Option<String>)> {
        let p = self.normalized();
        vec![
            ("page", opt(p.page)),
            ("limit", opt(p.limit)),
            ("claimed", opt(p.claimed)),
            ("search", opt(p.search)),
            ("sort_order", opt(p.sort_order)),
        ]
    }
}

impl KeyParams for DashboardParams {
    fn key_pairs(&self) -> Vec<(&'static str, Option<String>)> {
        let p = self.normalized();
        vec![("from", opt_date(p.from)), ("to", opt_date(p.to))]
    }
}

fn entity_key(namespace: &str, id: &str) -> String {
    format!("{namespace}:{}", encode(id))
}

fn collection_key<P: KeyParams>(namespace: &str, scope_id: &str, params: &P) -> String {
    format!("{namespace}:{}:{}", encode(scope_id), canonical_params(params))
}

pub fn goal_key(goal_id: &str) -> String {
    entity_key(GOAL, goal_id)
}

pub fn subtask_key(subtask_id: &str) -> String {
    entity_key(SUBTASK, subtask_id)
}

pub fn reward_key(reward_id: &str) -> String {
    entity_key(REWARD, reward_id)
}

pub fn user_key(user_id: &str) -> String {
    entity_key(USER, user_id)
}

pub fn goals_list_key(user_id: &str, params: &GoalListParams) -> String {
    collection_key(GOALS_LIST, user_id, params)
}

pub fn subtasks_list_key(goal_id: &str, params: &SubtaskListParams) -> String {
    collection_key(SUBTASKS_LIST, goal_id, params)
}

pub fn rewards_list_key(user_id: &str, params: &RewardListParams) -> String {
    collection_key(REWARDS_LIST, user_id, params)
}

pub fn dashboard_key(user_id: &str, params: &DashboardParams) -> String {
    collection_key(DASHBOARD, user_id, params)
}

/// Logical key of the registry set for `user_id`
pub fn user_registry_key(user_id: &str) -> String {
    entity_key(USER_KEYS, user_id)
}
