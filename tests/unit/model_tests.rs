//! Unit tests for the domain models: the task status state machine,
//! profile provisioning defaults, enum wire formats, and the attachment
//! allow-list helpers.

use chrono::{Duration, Utc};
use internhub::models::chat::ChatMessage;
use internhub::models::profile::{Profile, Role};
use internhub::models::task::{Task, TaskPriority, TaskStatus, DEFAULT_TASK_POINTS};
use internhub::models::upload::{
    file_extension, is_allowed_extension, is_allowed_mime, MAX_UPLOAD_BYTES,
};

fn sample_task() -> Task {
    Task::new(
        "Index the onboarding docs".into(),
        Some("Everything under docs/onboarding".into()),
        TaskPriority::Medium,
        DEFAULT_TASK_POINTS,
        None,
        Some("profile-a".into()),
        Some("profile-b".into()),
    )
}

// ── Task state machine ───────────────────────────────

#[test]
fn pending_moves_to_in_progress_or_overdue() {
    assert!(TaskStatus::Pending.can_transition_to(TaskStatus::InProgress));
    assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Overdue));
    assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
    assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Pending));
}

#[test]
fn in_progress_moves_to_completed_or_overdue() {
    assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Completed));
    assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Overdue));
    assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::Pending));
}

#[test]
fn completed_is_terminal() {
    for next in [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Overdue,
    ] {
        assert!(
            !TaskStatus::Completed.can_transition_to(next),
            "completed must not move to {next:?}"
        );
    }
}

#[test]
fn overdue_has_no_exits() {
    for next in [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Overdue,
    ] {
        assert!(
            !TaskStatus::Overdue.can_transition_to(next),
            "overdue must not move to {next:?}"
        );
    }
}

#[test]
fn new_task_starts_pending_without_completion() {
    let task = sample_task();
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.completed_at.is_none());
    assert_eq!(task.points, DEFAULT_TASK_POINTS);
}

#[test]
fn task_due_in_the_past_is_sweepable() {
    let mut task = sample_task();
    task.due_date = Some(Utc::now() - Duration::hours(1));
    assert!(task.is_due_for_overdue(Utc::now()));
}

#[test]
fn task_without_due_date_is_never_sweepable() {
    let task = sample_task();
    assert!(!task.is_due_for_overdue(Utc::now()));
}

#[test]
fn completed_task_is_not_sweepable() {
    let mut task = sample_task();
    task.status = TaskStatus::Completed;
    task.due_date = Some(Utc::now() - Duration::hours(1));
    assert!(!task.is_due_for_overdue(Utc::now()));
}

// ── Wire formats ─────────────────────────────────────

#[test]
fn task_status_serialization() {
    let values = [
        (TaskStatus::Pending, "\"pending\""),
        (TaskStatus::InProgress, "\"in_progress\""),
        (TaskStatus::Completed, "\"completed\""),
        (TaskStatus::Overdue, "\"overdue\""),
    ];

    for (variant, expected) in values {
        let json = serde_json::to_string(&variant).expect("serialize");
        assert_eq!(json, expected, "TaskStatus::{variant:?}");
        let back: TaskStatus = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, variant);
    }
}

#[test]
fn task_priority_serialization() {
    let values = [
        (TaskPriority::Low, "\"low\""),
        (TaskPriority::Medium, "\"medium\""),
        (TaskPriority::High, "\"high\""),
    ];

    for (variant, expected) in values {
        let json = serde_json::to_string(&variant).expect("serialize");
        assert_eq!(json, expected, "TaskPriority::{variant:?}");
    }
}

#[test]
fn role_serialization() {
    let values = [
        (Role::Intern, "\"intern\""),
        (Role::Employee, "\"employee\""),
        (Role::Admin, "\"admin\""),
    ];

    for (variant, expected) in values {
        let json = serde_json::to_string(&variant).expect("serialize");
        assert_eq!(json, expected, "Role::{variant:?}");
    }
}

// ── Profile ──────────────────────────────────────────

#[test]
fn provisioned_profile_is_an_intern_with_zero_points() {
    let profile = Profile::new("auth-1".into(), "ada@example.com".into(), None);
    assert_eq!(profile.role, Role::Intern);
    assert_eq!(profile.points, 0);
    assert!(profile.department.is_none());
}

#[test]
fn staff_covers_employee_and_admin_only() {
    assert!(!Role::Intern.is_staff());
    assert!(Role::Employee.is_staff());
    assert!(Role::Admin.is_staff());
}

// ── ChatMessage ──────────────────────────────────────

#[test]
fn new_message_starts_unread() {
    let message = ChatMessage::new("a".into(), "b".into(), "hello".into());
    assert!(message.read_at.is_none());
    assert_eq!(message.sender_id, "a");
    assert_eq!(message.receiver_id, "b");
}

// ── Attachment allow-list ────────────────────────────

#[test]
fn allowed_mime_types_accept_documents_and_images() {
    assert!(is_allowed_mime("image/png"));
    assert!(is_allowed_mime("application/pdf"));
    assert!(is_allowed_mime("text/plain"));
    assert!(is_allowed_mime(
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    ));
    assert!(!is_allowed_mime("application/zip"));
    assert!(!is_allowed_mime("text/html"));
}

#[test]
fn extension_check_is_case_insensitive() {
    assert!(is_allowed_extension("report.PDF"));
    assert!(is_allowed_extension("photo.JPeG"));
    assert!(!is_allowed_extension("script.sh"));
}

#[test]
fn filenames_without_extension_are_rejected() {
    assert!(!is_allowed_extension("README"));
    assert!(!is_allowed_extension("archive."));
    assert_eq!(file_extension("README"), None);
    assert_eq!(file_extension("archive."), None);
}

#[test]
fn file_extension_takes_the_last_segment() {
    assert_eq!(file_extension("notes.tar.txt"), Some("txt".into()));
    assert_eq!(file_extension("photo.PNG"), Some("png".into()));
}

#[test]
fn upload_ceiling_is_five_mebibytes() {
    assert_eq!(MAX_UPLOAD_BYTES, 5 * 1024 * 1024);
}
