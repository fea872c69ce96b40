//! Integration tests for profile reads and the owner-only self-edit.

use std::sync::Arc;

use internhub::models::profile::Role;
use internhub::services::profile_service::{ProfileEdit, ProfileService};
use internhub::AppError;

use super::test_helpers::{actor_for, balance_of, memory_db, seed_profile};

#[tokio::test]
async fn any_actor_reads_any_profile() {
    let db = memory_db().await;
    let intern = seed_profile(&db, "intern@example.com", Role::Intern, 0).await;
    let employee = seed_profile(&db, "emp@example.com", Role::Employee, 0).await;
    let service = ProfileService::new(db);

    let fetched = service
        .get(&actor_for(&intern), &employee.id)
        .await
        .expect("read");
    assert_eq!(fetched.email, "emp@example.com");

    let all = service.list(&actor_for(&intern)).await.expect("list");
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn missing_profiles_are_not_found() {
    let db = memory_db().await;
    let intern = seed_profile(&db, "intern@example.com", Role::Intern, 0).await;
    let service = ProfileService::new(db);

    let result = service.get(&actor_for(&intern), "ghost").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn owners_edit_their_own_display_fields() {
    let db = memory_db().await;
    let intern = seed_profile(&db, "intern@example.com", Role::Intern, 25).await;
    let service = ProfileService::new(Arc::clone(&db));

    let updated = service
        .update_own(
            &actor_for(&intern),
            &intern.id,
            ProfileEdit {
                display_name: Some("Ada L.".into()),
                department: Some("Research".into()),
            },
        )
        .await
        .expect("edit");

    assert_eq!(updated.display_name, Some("Ada L.".to_owned()));
    assert_eq!(updated.department, Some("Research".to_owned()));
    // Role and balance are unreachable through self-edit.
    assert_eq!(updated.role, Role::Intern);
    assert_eq!(balance_of(&db, &intern.id).await, 25);
}

#[tokio::test]
async fn partial_edits_keep_existing_values() {
    let db = memory_db().await;
    let intern = seed_profile(&db, "intern@example.com", Role::Intern, 0).await;
    let service = ProfileService::new(db);
    let actor = actor_for(&intern);

    service
        .update_own(
            &actor,
            &intern.id,
            ProfileEdit {
                display_name: Some("Ada L.".into()),
                department: Some("Research".into()),
            },
        )
        .await
        .expect("first edit");

    let updated = service
        .update_own(
            &actor,
            &intern.id,
            ProfileEdit {
                display_name: None,
                department: Some("Platform".into()),
            },
        )
        .await
        .expect("second edit");

    assert_eq!(updated.display_name, Some("Ada L.".to_owned()));
    assert_eq!(updated.department, Some("Platform".to_owned()));
}

#[tokio::test]
async fn editing_someone_elses_profile_is_forbidden() {
    let db = memory_db().await;
    let intern = seed_profile(&db, "intern@example.com", Role::Intern, 0).await;
    let admin = seed_profile(&db, "admin@example.com", Role::Admin, 0).await;
    let service = ProfileService::new(db);

    // Not even an admin edits another profile through this path.
    let result = service
        .update_own(
            &actor_for(&admin),
            &intern.id,
            ProfileEdit {
                display_name: Some("Renamed".into()),
                department: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}
