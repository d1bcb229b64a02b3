//! # Read-through and invalidation behaviour
//!
//! End-to-end through the services with the in-process cache backend.

mod common;

use common::TestContext;
use goaltrack_core::cache::keys::{goal_key, goals_list_key, user_registry_key};
use goaltrack_core::cache::CacheStatus;
use goaltrack_core::models::{
    GoalListParams, GoalStatus, GoalUpdate, NewGoal, NewSubtask, RewardListParams, SubtaskUpdate,
};

fn active_page_one() -> GoalListParams {
    GoalListParams {
        page: Some(1),
        status: Some(GoalStatus::Active),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_goal_list_update_scenario() {
    let ctx = TestContext::memory();
    ctx.seed_goal("g1", "u1", "Run a marathon", 2).await;
    ctx.seed_goal("g2", "u1", "Read 12 books", 1).await;
    ctx.take_reads();

    let params = active_page_one();
    let first = ctx.services.goals.list("u1", &params).await.unwrap();
    assert_eq!(first.status, CacheStatus::Miss);
    let ids: Vec<&str> = first.value.items.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["g2", "g1"]);
    assert_eq!(ctx.take_reads(), 1);

    // Populated and tracked
    let key = goals_list_key("u1", &params);
    assert!(key.starts_with("goals:user:u1:"));
    assert!(key.contains("page=1"));
    assert!(key.contains("status=active"));
    let memory = ctx.cache.memory_backend().unwrap();
    let registry = memory.set_members(&ctx.cache.physical_key(&user_registry_key("u1")));
    assert!(registry.contains(&ctx.cache.physical_key(&key)));

    // Warm the entity key so the update has a snapshot to invalidate
    let before = ctx.services.goals.get("u1", "g1").await.unwrap();
    assert_eq!(before.value.title, "Run a marathon");
    ctx.take_reads();

    ctx.services
        .goals
        .update(
            "u1",
            "g1",
            GoalUpdate {
                title: Some("Run a half marathon".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!memory.contains_key(&ctx.cache.physical_key(&goal_key("g1"))));
    assert!(!memory.contains_key(&ctx.cache.physical_key(&key)));
    ctx.take_reads();

    let again = ctx.services.goals.list("u1", &params).await.unwrap();
    assert_eq!(again.status, CacheStatus::Miss);
    assert_eq!(ctx.take_reads(), 1);
    assert!(again
        .value
        .items
        .iter()
        .any(|g| g.title == "Run a half marathon"));

    let after = ctx.services.goals.get("u1", "g1").await.unwrap();
    assert_eq!(after.status, CacheStatus::Miss);
    assert_eq!(after.value.title, "Run a half marathon");
}

#[tokio::test]
async fn test_second_identical_read_is_served_from_cache() {
    let ctx = TestContext::memory();
    ctx.seed_goal("g1", "u1", "Run", 0).await;
    ctx.take_reads();

    let params = GoalListParams::default();
    let first = ctx.services.goals.list("u1", &params).await.unwrap();
    let second = ctx.services.goals.list("u1", &params).await.unwrap();

    assert_eq!(first.status, CacheStatus::Miss);
    assert_eq!(second.status, CacheStatus::Hit);
    assert_eq!(first.value, second.value);
    assert_eq!(ctx.take_reads(), 1);
}

#[tokio::test]
async fn test_invalidate_user_forces_every_query_back_to_the_store() {
    let ctx = TestContext::memory();
    ctx.seed_goal("g1", "u1", "Run", 1).await;
    ctx.seed_goal("g2", "u1", "Swim", 0).await;

    let queries = vec![
        GoalListParams::default(),
        active_page_one(),
        GoalListParams {
            page: Some(2),
            ..Default::default()
        },
        GoalListParams {
            search: Some("run".into()),
            ..Default::default()
        },
        GoalListParams {
            limit: Some(1),
            ..Default::default()
        },
    ];
    let n = queries.len() as u64;

    for params in &queries {
        ctx.services.goals.list("u1", params).await.unwrap();
    }
    ctx.services
        .rewards
        .list("u1", &RewardListParams::default())
        .await
        .unwrap();
    ctx.take_reads();

    for params in &queries {
        assert!(ctx.services.goals.list("u1", params).await.unwrap().is_hit());
    }
    assert_eq!(ctx.take_reads(), 0);

    // Every tracked key plus the registry itself
    let removed = ctx.cache.invalidate_user("u1").await.unwrap();
    assert_eq!(removed, n + 2);

    for params in &queries {
        let result = ctx.services.goals.list("u1", params).await.unwrap();
        assert_eq!(result.status, CacheStatus::Miss);
    }
    assert_eq!(ctx.take_reads(), n);
}

#[tokio::test]
async fn test_invalidation_is_scoped_to_the_writing_user() {
    let ctx = TestContext::memory();
    ctx.seed_goal("g1", "u1", "Run", 0).await;
    ctx.seed_goal("g2", "u2", "Swim", 0).await;
    let params = GoalListParams::default();
    ctx.services.goals.list("u1", &params).await.unwrap();
    ctx.services.goals.list("u2", &params).await.unwrap();

    ctx.services
        .goals
        .create("u1", NewGoal { title: "Cycle".into(), ..Default::default() })
        .await
        .unwrap();

    assert!(!ctx.services.goals.list("u1", &params).await.unwrap().is_hit());
    assert!(ctx.services.goals.list("u2", &params).await.unwrap().is_hit());
}

#[tokio::test]
async fn test_subtask_write_recomputes_parent_progress() {
    let ctx = TestContext::memory();
    let goal = ctx
        .services
        .goals
        .create("u1", NewGoal { title: "Learn Rust".into(), ..Default::default() })
        .await
        .unwrap();
    let mut subtasks = Vec::new();
    for title in ["Ownership", "Traits", "Async"] {
        subtasks.push(
            ctx.services
                .subtasks
                .create("u1", &goal.id, NewSubtask { title: title.into(), ..Default::default() })
                .await
                .unwrap(),
        );
    }

    // Cache the goal at 0%
    assert_eq!(ctx.services.goals.get("u1", &goal.id).await.unwrap().value.progress, 0.0);
    assert!(ctx.services.goals.get("u1", &goal.id).await.unwrap().is_hit());

    ctx.services
        .subtasks
        .update(
            "u1",
            &subtasks[0].id,
            SubtaskUpdate {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    ctx.services
        .subtasks
        .update(
            "u1",
            &subtasks[1].id,
            SubtaskUpdate {
                progress: Some(50.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let fetched = ctx.services.goals.get("u1", &goal.id).await.unwrap();
    assert_eq!(fetched.status, CacheStatus::Miss);
    assert_eq!(fetched.value.progress, 50.0);

    ctx.services.subtasks.delete("u1", &subtasks[2].id).await.unwrap();
    let fetched = ctx.services.goals.get("u1", &goal.id).await.unwrap();
    assert_eq!(fetched.value.progress, 75.0);
}

#[tokio::test]
async fn test_progress_is_rounded_to_two_decimals() {
    let ctx = TestContext::memory();
    let goal = ctx
        .services
        .goals
        .create("u1", NewGoal { title: "Thirds".into(), ..Default::default() })
        .await
        .unwrap();
    for progress in [100.0, 0.0, 0.0] {
        ctx.services
            .subtasks
            .create(
                "u1",
                &goal.id,
                NewSubtask {
                    title: "part".into(),
                    progress: Some(progress),
                    due_date: None,
                },
            )
            .await
            .unwrap();
    }
    let fetched = ctx.services.goals.get("u1", &goal.id).await.unwrap();
    assert_eq!(fetched.value.progress, 33.33);
}

#[tokio::test]
async fn test_disabled_cache_degrades_to_the_store() {
    let ctx = TestContext::uncached();
    ctx.seed_goal("g1", "u1", "Run", 0).await;
    ctx.take_reads();

    let params = GoalListParams::default();
    for _ in 0..3 {
        let result = ctx.services.goals.list("u1", &params).await.unwrap();
        assert_eq!(result.status, CacheStatus::Miss);
        assert_eq!(result.value.total, 1);
    }
    assert_eq!(ctx.take_reads(), 3);

    ctx.services
        .goals
        .update(
            "u1",
            "g1",
            GoalUpdate {
                status: Some(GoalStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let goal = ctx.services.goals.get("u1", "g1").await.unwrap().into_inner();
    assert_eq!(goal.status, GoalStatus::Completed);
    assert_eq!(goal.progress, 100.0);
}
