//! Chat message repository for `SQLite` persistence.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::chat::ChatMessage;
use crate::{AppError, Result};

use super::db::Database;

/// Repository wrapper around `SQLite` for chat message records.
#[derive(Clone)]
pub struct ChatRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct MessageRow {
    id: String,
    sender_id: String,
    receiver_id: String,
    content: String,
    read_at: Option<String>,
    created_at: String,
}

impl MessageRow {
    /// Convert a database row into the domain model.
    fn into_message(self) -> Result<ChatMessage> {
        let read_at = self
            .read_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;
        Ok(ChatMessage {
            created_at: parse_timestamp(&self.created_at)?,
            read_at,
            id: self.id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            content: self.content,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Upstream(format!("invalid message timestamp: {e}")))
}

impl ChatRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new message record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the database insert fails.
    pub async fn create(&self, message: &ChatMessage) -> Result<ChatMessage> {
        sqlx::query(
            "INSERT INTO chat_message (id, sender_id, receiver_id, content, read_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&message.id)
        .bind(&message.sender_id)
        .bind(&message.receiver_id)
        .bind(&message.content)
        .bind(message.read_at.map(|dt| dt.to_rfc3339()))
        .bind(message.created_at.to_rfc3339())
        .execute(self.db.as_ref())
        .await?;

        Ok(message.clone())
    }

    /// Retrieve a message by identifier.
    ///
    /// Returns `Ok(None)` if the message does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<ChatMessage>> {
        let row: Option<MessageRow> = sqlx::query_as("SELECT * FROM chat_message WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;

        row.map(MessageRow::into_message).transpose()
    }

    /// List both directions of a conversation in creation order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the query fails.
    pub async fn conversation(&self, a: &str, b: &str) -> Result<Vec<ChatMessage>> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT * FROM chat_message
             WHERE (sender_id = ?1 AND receiver_id = ?2)
                OR (sender_id = ?2 AND receiver_id = ?1)
             ORDER BY created_at",
        )
        .bind(a)
        .bind(b)
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(MessageRow::into_message).collect()
    }

    /// Stamp unread messages from `sender_id` to `receiver_id` as read.
    ///
    /// Only rows with a null `read_at` are touched, so the timestamp is
    /// set exactly once per message.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` if the update fails.
    pub async fn mark_read(&self, receiver_id: &str, sender_id: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE chat_message SET read_at = ?1
             WHERE receiver_id = ?2 AND sender_id = ?3 AND read_at IS NULL",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(receiver_id)
        .bind(sender_id)
        .execute(self.db.as_ref())
        .await?;

        Ok(result.rows_affected())
    }
}
