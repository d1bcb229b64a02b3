//! Property tests for cache key derivation

use chrono::{TimeZone, Utc};
use goaltrack_core::cache::keys::{goals_list_key, subtasks_list_key, user_registry_key};
use goaltrack_core::models::{
    GoalListParams, GoalSortField, GoalStatus, SortOrder, SubtaskListParams,
};
use proptest::prelude::*;

fn status_strategy() -> impl Strategy<Value = Option<GoalStatus>> {
    prop_oneof![
        Just(None),
        Just(Some(GoalStatus::Active)),
        Just(Some(GoalStatus::Completed)),
        Just(Some(GoalStatus::Archived)),
    ]
}

fn sort_strategy() -> impl Strategy<Value = Option<GoalSortField>> {
    prop_oneof![
        Just(None),
        Just(Some(GoalSortField::CreatedAt)),
        Just(Some(GoalSortField::DueDate)),
        Just(Some(GoalSortField::Title)),
        Just(Some(GoalSortField::Progress)),
    ]
}

fn order_strategy() -> impl Strategy<Value = Option<SortOrder>> {
    prop_oneof![Just(None), Just(Some(SortOrder::Asc)), Just(Some(SortOrder::Desc))]
}

/// Search text including the characters the key format itself uses
fn search_strategy() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-z =&:%_]{0,8}")
}

fn goal_params_strategy() -> impl Strategy<Value = GoalListParams> {
    (
        proptest::option::of(0u32..5),
        proptest::option::of(0u32..150),
        status_strategy(),
        search_strategy(),
        proptest::option::of(0i64..3),
        sort_strategy(),
        order_strategy(),
    )
        .prop_map(|(page, limit, status, search, due_after_day, sort_by, sort_order)| {
            GoalListParams {
                page,
                limit,
                status,
                search,
                due_after: due_after_day
                    .map(|d| Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(d)),
                due_before: None,
                sort_by,
                sort_order,
            }
        })
}

fn user_id_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9:&=]{1,6}"
}

proptest! {
    /// Property: the same request always produces the same key
    #[test]
    fn goal_keys_are_deterministic(user in user_id_strategy(), params in goal_params_strategy()) {
        prop_assert_eq!(goals_list_key(&user, &params), goals_list_key(&user, &params.clone()));
        prop_assert_eq!(
            goals_list_key(&user, &params),
            goals_list_key(&user, &params.normalized())
        );
    }

    /// Property: requests with different meaning never share a key
    #[test]
    fn goal_keys_are_unique(
        a in goal_params_strategy(),
        b in goal_params_strategy(),
        user_a in user_id_strategy(),
        user_b in user_id_strategy(),
    ) {
        let same_request = user_a == user_b && a.normalized() == b.normalized();
        let same_key = goals_list_key(&user_a, &a) == goals_list_key(&user_b, &b);
        prop_assert_eq!(same_request, same_key);
    }

    /// Property: each key scope keeps its own prefix
    #[test]
    fn key_scopes_do_not_collide(id in user_id_strategy(), params in goal_params_strategy()) {
        let goals = goals_list_key(&id, &params);
        let subtasks = subtasks_list_key(&id, &SubtaskListParams::default());
        let registry = user_registry_key(&id);
        prop_assert!(goals.starts_with("goals:user:"));
        prop_assert!(subtasks.starts_with("subtasks:goal:"));
        prop_assert!(registry.starts_with("user_keys:"));
        prop_assert_ne!(goals, subtasks);
    }
}

#[test]
fn test_parameter_order_does_not_matter() {
    let from_query: GoalListParams =
        serde_json::from_str(r#"{"status":"active","page":1}"#).unwrap();
    let reordered: GoalListParams =
        serde_json::from_str(r#"{"page":1,"status":"active"}"#).unwrap();
    assert_eq!(goals_list_key("u1", &from_query), goals_list_key("u1", &reordered));
}
