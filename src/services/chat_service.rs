//! Direct messaging service.
//!
//! Delivery is poll-based: receivers observe new messages on their next
//! conversation fetch, which also stamps unread messages addressed to
//! them as read. There is no push channel and no ordering guarantee
//! beyond creation timestamps.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::models::chat::ChatMessage;
use crate::persistence::chat_repo::ChatRepo;
use crate::persistence::db::Database;
use crate::persistence::profile_repo::ProfileRepo;
use crate::policy::predicates;
use crate::policy::Actor;
use crate::{AppError, Result};

/// Parameters for sending a message.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    /// Sender profile id; must match the authenticated caller.
    pub sender_id: String,
    /// Receiver profile id.
    pub receiver_id: String,
    /// Message body.
    pub content: String,
}

/// Service for sending and fetching direct messages.
#[derive(Clone)]
pub struct ChatService {
    messages: ChatRepo,
    profiles: ProfileRepo,
}

impl ChatService {
    /// Create a new service instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            messages: ChatRepo::new(Arc::clone(&db)),
            profiles: ProfileRepo::new(db),
        }
    }

    /// Send a message under the caller's own identity.
    ///
    /// Sender equal to receiver is not rejected; the stored record is
    /// what the caller asked for.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when the sender field is not the
    /// caller, `AppError::ConstraintViolation` for empty content, and
    /// `AppError::NotFound` for an unknown receiver.
    pub async fn send(&self, actor: &Actor, new_message: NewMessage) -> Result<ChatMessage> {
        if !predicates::can_send_message(actor, &new_message.sender_id) {
            return Err(AppError::Forbidden(
                "messages may only be sent under the caller's own profile".into(),
            ));
        }
        if new_message.content.trim().is_empty() {
            return Err(AppError::ConstraintViolation(
                "message content must not be empty".into(),
            ));
        }
        self.require_profile(&new_message.receiver_id).await?;

        let message = ChatMessage::new(
            new_message.sender_id,
            new_message.receiver_id,
            new_message.content,
        );
        self.messages.create(&message).await
    }

    /// Fetch the conversation between the caller and `peer_id`.
    ///
    /// Unread messages addressed to the caller are stamped read before
    /// the fetch; the stamp happens at most once per message. The fetch
    /// itself is idempotent.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown peer, or
    /// `AppError::Upstream` on persistence failure.
    pub async fn conversation(&self, actor: &Actor, peer_id: &str) -> Result<Vec<ChatMessage>> {
        self.require_profile(peer_id).await?;

        let stamped = self.messages.mark_read(&actor.profile_id, peer_id).await?;
        if stamped > 0 {
            debug!(peer_id, stamped, "messages marked read");
        }

        let mut messages = self.messages.conversation(&actor.profile_id, peer_id).await?;
        // The pair filter in the query already scopes rows to the caller;
        // the predicate stays as the second line of defense.
        messages.retain(|m| predicates::can_read_message(actor, m));
        Ok(messages)
    }

    async fn require_profile(&self, profile_id: &str) -> Result<()> {
        self.profiles
            .get_by_id(profile_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("profile {profile_id} not found")))
    }
}
