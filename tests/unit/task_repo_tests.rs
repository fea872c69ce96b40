//! Unit tests for `TaskRepo`, including the transactional status write
//! with its conditional previous-status guard and balance update.

use std::sync::Arc;

use chrono::{Duration, Utc};
use internhub::models::profile::Profile;
use internhub::models::task::{Task, TaskPriority, TaskStatus};
use internhub::persistence::db::Database;
use internhub::persistence::{
    db,
    profile_repo::ProfileRepo,
    task_repo::{BalanceDelta, TaskFieldUpdate, TaskRepo},
};
use internhub::AppError;

fn sample_task(assignee: Option<&str>) -> Task {
    Task::new(
        "Write the weekly digest".into(),
        None,
        TaskPriority::Medium,
        10,
        None,
        assignee.map(str::to_owned),
        Some("creator-1".to_owned()),
    )
}

async fn seed_profile(db: &Arc<Database>, points: i64) -> Profile {
    let repo = ProfileRepo::new(Arc::clone(db));
    let mut profile = Profile::new(
        format!("auth-{}", uuid::Uuid::new_v4()),
        "intern@example.com".into(),
        None,
    );
    profile.points = points;
    repo.create(&profile).await.expect("seed profile")
}

#[tokio::test]
async fn create_persists_all_fields() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(db);

    let task = sample_task(Some("i1"));
    let id = task.id.clone();
    repo.create(&task).await.expect("create");

    let fetched = repo.get_by_id(&id).await.expect("query").expect("exists");
    assert_eq!(fetched.title, "Write the weekly digest");
    assert_eq!(fetched.status, TaskStatus::Pending);
    assert_eq!(fetched.priority, TaskPriority::Medium);
    assert_eq!(fetched.points, 10);
    assert_eq!(fetched.assignee_id, Some("i1".to_owned()));
    assert!(fetched.completed_at.is_none());
}

#[tokio::test]
async fn get_by_id_returns_none_for_missing() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(db);

    let result = repo.get_by_id("nonexistent").await.expect("query");
    assert!(result.is_none());
}

#[tokio::test]
async fn list_for_member_covers_assignee_and_creator() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(db);

    let assigned = sample_task(Some("i1"));
    let mut created = sample_task(None);
    created.created_by = Some("i1".to_owned());
    let unrelated = sample_task(Some("i2"));

    repo.create(&assigned).await.expect("create assigned");
    repo.create(&created).await.expect("create created");
    repo.create(&unrelated).await.expect("create unrelated");

    let mine = repo.list_for_member("i1").await.expect("list");
    let ids: Vec<&str> = mine.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(mine.len(), 2);
    assert!(ids.contains(&assigned.id.as_str()));
    assert!(ids.contains(&created.id.as_str()));
}

#[tokio::test]
async fn list_due_for_sweep_skips_terminal_and_undated_tasks() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(db);

    let mut due = sample_task(Some("i1"));
    due.due_date = Some(Utc::now() - Duration::hours(2));
    let mut not_due = sample_task(Some("i1"));
    not_due.due_date = Some(Utc::now() + Duration::hours(2));
    let undated = sample_task(Some("i1"));
    let mut done = sample_task(Some("i1"));
    done.due_date = Some(Utc::now() - Duration::hours(2));
    done.status = TaskStatus::Completed;

    repo.create(&due).await.expect("create due");
    repo.create(&not_due).await.expect("create not due");
    repo.create(&undated).await.expect("create undated");
    repo.create(&done).await.expect("create done");

    let candidates = repo.list_due_for_sweep(Utc::now()).await.expect("sweep list");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, due.id);
}

#[tokio::test]
async fn update_fields_keeps_untouched_values() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(db);

    let task = sample_task(Some("i1"));
    repo.create(&task).await.expect("create");

    let update = TaskFieldUpdate {
        title: Some("Write the monthly digest".into()),
        ..TaskFieldUpdate::default()
    };
    let updated = repo.update_fields(&task.id, &update).await.expect("update");

    assert_eq!(updated.title, "Write the monthly digest");
    assert_eq!(updated.assignee_id, Some("i1".to_owned()));
    assert_eq!(updated.priority, TaskPriority::Medium);
    assert_eq!(updated.points, 10);
}

#[tokio::test]
async fn update_fields_clears_with_explicit_none() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(db);

    let mut task = sample_task(Some("i1"));
    task.due_date = Some(Utc::now() + Duration::days(1));
    repo.create(&task).await.expect("create");

    let update = TaskFieldUpdate {
        assignee_id: Some(None),
        due_date: Some(None),
        ..TaskFieldUpdate::default()
    };
    let updated = repo.update_fields(&task.id, &update).await.expect("update");

    assert!(updated.assignee_id.is_none());
    assert!(updated.due_date.is_none());
}

#[tokio::test]
async fn update_fields_of_a_missing_task_is_not_found() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(db);

    let result = repo
        .update_fields("ghost", &TaskFieldUpdate::default())
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn transition_writes_status_and_balance_atomically() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let profiles = ProfileRepo::new(Arc::clone(&db));
    let repo = TaskRepo::new(Arc::clone(&db));

    let assignee = seed_profile(&db, 0).await;
    let mut task = sample_task(Some(&assignee.id));
    task.status = TaskStatus::InProgress;
    repo.create(&task).await.expect("create");

    let updated = repo
        .apply_transition(
            &task.id,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            Some(BalanceDelta {
                profile_id: assignee.id.clone(),
                delta: 10,
            }),
        )
        .await
        .expect("transition");

    assert_eq!(updated.status, TaskStatus::Completed);
    assert!(updated.completed_at.is_some());

    let balance = profiles
        .get_by_id(&assignee.id)
        .await
        .expect("query")
        .expect("exists")
        .points;
    assert_eq!(balance, 10);
}

#[tokio::test]
async fn losing_an_identical_race_credits_exactly_once() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let profiles = ProfileRepo::new(Arc::clone(&db));
    let repo = TaskRepo::new(Arc::clone(&db));

    let assignee = seed_profile(&db, 0).await;
    let mut task = sample_task(Some(&assignee.id));
    task.status = TaskStatus::InProgress;
    repo.create(&task).await.expect("create");

    let delta = BalanceDelta {
        profile_id: assignee.id.clone(),
        delta: 10,
    };

    // Both writers observed in_progress; the second conditional write
    // matches zero rows and settles as a no-op.
    repo.apply_transition(
        &task.id,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        Some(delta.clone()),
    )
    .await
    .expect("winner");
    let second = repo
        .apply_transition(
            &task.id,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            Some(delta),
        )
        .await
        .expect("loser settles as no-op");

    assert_eq!(second.status, TaskStatus::Completed);

    let balance = profiles
        .get_by_id(&assignee.id)
        .await
        .expect("query")
        .expect("exists")
        .points;
    assert_eq!(balance, 10, "exactly one credit despite two writers");
}

#[tokio::test]
async fn conflicting_concurrent_change_is_an_invalid_transition() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(db);

    let task = sample_task(None);
    repo.create(&task).await.expect("create");

    // Another writer moved pending -> in_progress first.
    repo.apply_transition(&task.id, TaskStatus::Pending, TaskStatus::InProgress, None)
        .await
        .expect("first writer");

    // This writer still believes the task is pending and wants overdue.
    let result = repo
        .apply_transition(&task.id, TaskStatus::Pending, TaskStatus::Overdue, None)
        .await;
    assert!(matches!(result, Err(AppError::InvalidTransition(_))));
}

#[tokio::test]
async fn debit_floors_the_balance_at_zero() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let profiles = ProfileRepo::new(Arc::clone(&db));
    let repo = TaskRepo::new(Arc::clone(&db));

    let assignee = seed_profile(&db, 3).await;
    let task = sample_task(Some(&assignee.id));
    repo.create(&task).await.expect("create");

    repo.apply_transition(
        &task.id,
        TaskStatus::Pending,
        TaskStatus::Overdue,
        Some(BalanceDelta {
            profile_id: assignee.id.clone(),
            delta: -5,
        }),
    )
    .await
    .expect("transition");

    let balance = profiles
        .get_by_id(&assignee.id)
        .await
        .expect("query")
        .expect("exists")
        .points;
    assert_eq!(balance, 0, "3 - 5 floors at zero, not -2");
}

#[tokio::test]
async fn transition_of_a_missing_task_is_not_found() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(db);

    let result = repo
        .apply_transition("ghost", TaskStatus::Pending, TaskStatus::InProgress, None)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn delete_removes_the_record() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(db);

    let task = sample_task(None);
    repo.create(&task).await.expect("create");
    repo.delete(&task.id).await.expect("delete");

    assert!(repo.get_by_id(&task.id).await.expect("query").is_none());
}

#[tokio::test]
async fn delete_of_a_missing_task_is_not_found() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = TaskRepo::new(db);

    let result = repo.delete("ghost").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
