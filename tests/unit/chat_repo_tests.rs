//! Unit tests for `ChatRepo`: conversation scoping, ordering, and the
//! single-shot read stamp.

use std::sync::Arc;

use internhub::models::chat::ChatMessage;
use internhub::persistence::{chat_repo::ChatRepo, db};

fn message(sender: &str, receiver: &str, content: &str) -> ChatMessage {
    ChatMessage::new(sender.to_owned(), receiver.to_owned(), content.to_owned())
}

#[tokio::test]
async fn create_persists_all_fields() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = ChatRepo::new(db);

    let msg = message("i1", "e1", "standup in five");
    repo.create(&msg).await.expect("create");

    let fetched = repo
        .get_by_id(&msg.id)
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(fetched.sender_id, "i1");
    assert_eq!(fetched.receiver_id, "e1");
    assert_eq!(fetched.content, "standup in five");
    assert!(fetched.read_at.is_none());
}

#[tokio::test]
async fn conversation_includes_both_directions_in_order() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = ChatRepo::new(db);

    let first = message("i1", "e1", "first");
    let mut second = message("e1", "i1", "second");
    let mut third = message("i1", "e1", "third");
    // Force distinct, ordered creation timestamps.
    second.created_at = first.created_at + chrono::Duration::seconds(1);
    third.created_at = first.created_at + chrono::Duration::seconds(2);

    repo.create(&second).await.expect("create second");
    repo.create(&third).await.expect("create third");
    repo.create(&first).await.expect("create first");

    let conversation = repo.conversation("i1", "e1").await.expect("conversation");
    let contents: Vec<&str> = conversation.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn conversation_excludes_other_pairs() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = ChatRepo::new(db);

    repo.create(&message("i1", "e1", "ours")).await.expect("create");
    repo.create(&message("i1", "e2", "different peer"))
        .await
        .expect("create");
    repo.create(&message("i2", "e1", "different sender"))
        .await
        .expect("create");

    let conversation = repo.conversation("i1", "e1").await.expect("conversation");
    assert_eq!(conversation.len(), 1);
    assert_eq!(conversation[0].content, "ours");
}

#[tokio::test]
async fn mark_read_stamps_only_unread_incoming_messages() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = ChatRepo::new(db);

    let incoming = message("e1", "i1", "welcome aboard");
    let outgoing = message("i1", "e1", "thanks");
    repo.create(&incoming).await.expect("create incoming");
    repo.create(&outgoing).await.expect("create outgoing");

    let stamped = repo.mark_read("i1", "e1").await.expect("mark read");
    assert_eq!(stamped, 1);

    let incoming_after = repo
        .get_by_id(&incoming.id)
        .await
        .expect("query")
        .expect("exists");
    assert!(incoming_after.read_at.is_some());

    // The caller's own outgoing message is untouched.
    let outgoing_after = repo
        .get_by_id(&outgoing.id)
        .await
        .expect("query")
        .expect("exists");
    assert!(outgoing_after.read_at.is_none());
}

#[tokio::test]
async fn mark_read_is_a_single_shot_per_message() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = ChatRepo::new(db);

    let msg = message("e1", "i1", "ping");
    repo.create(&msg).await.expect("create");

    assert_eq!(repo.mark_read("i1", "e1").await.expect("first"), 1);
    let first_stamp = repo
        .get_by_id(&msg.id)
        .await
        .expect("query")
        .expect("exists")
        .read_at;

    // A second fetch finds nothing unread and changes nothing.
    assert_eq!(repo.mark_read("i1", "e1").await.expect("second"), 0);
    let second_stamp = repo
        .get_by_id(&msg.id)
        .await
        .expect("query")
        .expect("exists")
        .read_at;
    assert_eq!(first_stamp, second_stamp);
}
