//! Authorization predicates gating every read and write.
//!
//! Each rule is a pure function over `(actor, resource)` so it can be
//! unit-tested without storage. Services call these at every entry
//! point; the query layer additionally pushes the same ownership
//! filters into list queries. A client-side check alone is never
//! trusted.

use crate::models::chat::ChatMessage;
use crate::models::profile::Role;
use crate::models::task::Task;
use crate::models::upload::FileUpload;

/// The authenticated caller: a resolved profile id plus its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Profile id of the caller.
    pub profile_id: String,
    /// Role of the caller's profile.
    pub role: Role,
}

impl Actor {
    /// Construct an actor from a resolved profile.
    #[must_use]
    pub fn new(profile_id: String, role: Role) -> Self {
        Self { profile_id, role }
    }
}

/// Any authenticated actor may read any profile.
#[must_use]
pub fn can_read_profile(_actor: &Actor) -> bool {
    true
}

/// Only the owner may edit their own profile fields.
#[must_use]
pub fn can_edit_profile(actor: &Actor, profile_id: &str) -> bool {
    actor.profile_id == profile_id
}

/// Assignee, creator, or staff may read a task.
#[must_use]
pub fn can_read_task(actor: &Actor, task: &Task) -> bool {
    actor.role.is_staff()
        || task.assignee_id.as_deref() == Some(actor.profile_id.as_str())
        || task.created_by.as_deref() == Some(actor.profile_id.as_str())
}

/// Only staff may create tasks.
#[must_use]
pub fn can_create_task(actor: &Actor) -> bool {
    actor.role.is_staff()
}

/// Only staff may update task fields.
#[must_use]
pub fn can_update_task(actor: &Actor) -> bool {
    actor.role.is_staff()
}

/// Assignee or staff may initiate a status transition; the state
/// machine then narrows which target is legal.
#[must_use]
pub fn can_transition_task(actor: &Actor, task: &Task) -> bool {
    actor.role.is_staff() || task.assignee_id.as_deref() == Some(actor.profile_id.as_str())
}

/// Only admins may delete tasks.
#[must_use]
pub fn can_delete_task(actor: &Actor) -> bool {
    actor.role == Role::Admin
}

/// Sender or receiver may read a message.
#[must_use]
pub fn can_read_message(actor: &Actor, message: &ChatMessage) -> bool {
    message.sender_id == actor.profile_id || message.receiver_id == actor.profile_id
}

/// A message may only be sent under the caller's own identity.
#[must_use]
pub fn can_send_message(actor: &Actor, sender_id: &str) -> bool {
    actor.profile_id == sender_id
}

/// Uploader, or the assignee of the associated task, may read an upload.
#[must_use]
pub fn can_read_upload(actor: &Actor, upload: &FileUpload, task_assignee: Option<&str>) -> bool {
    upload.uploader_id == actor.profile_id || task_assignee == Some(actor.profile_id.as_str())
}

/// An upload may only be created under the caller's own identity.
#[must_use]
pub fn can_create_upload(actor: &Actor, uploader_id: &str) -> bool {
    actor.profile_id == uploader_id
}
