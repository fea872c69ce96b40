//! Direct message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable directed message between two profiles.
///
/// Messages are never edited or deleted; `read_at` is set once by the
/// receiver's next conversation fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Unique record identifier.
    pub id: String,
    /// Sending profile.
    pub sender_id: String,
    /// Receiving profile.
    pub receiver_id: String,
    /// Message body; never empty.
    pub content: String,
    /// Set when the receiver first fetches the conversation.
    pub read_at: Option<DateTime<Utc>>,
    /// Creation timestamp; the only ordering guarantee.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Construct a new unread message with a generated identifier.
    #[must_use]
    pub fn new(sender_id: String, receiver_id: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender_id,
            receiver_id,
            content,
            read_at: None,
            created_at: Utc::now(),
        }
    }
}
