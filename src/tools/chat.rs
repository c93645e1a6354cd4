//! Chat Tools
//!
//! Tool layer over the keyword assistant and the stored transcript.

use serde::Serialize;

use crate::assistant::{generate_reply, AssistantContext, GREETING, QUICK_QUESTIONS};
use crate::db::Database;
use crate::models::{ChatMessage, ChatRole, Profile};

/// Response for send_chat_message
#[derive(Debug, Serialize)]
pub struct SendChatResponse {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}

/// Response for get_chat_history
#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub messages: Vec<ChatMessage>,
    pub total: i64,
    pub quick_questions: Vec<&'static str>,
}

/// Response for clear_chat_history
#[derive(Debug, Serialize)]
pub struct ClearChatResponse {
    pub deleted: i64,
}

/// Seed the opening assistant greeting into an empty transcript
fn ensure_greeting(conn: &rusqlite::Connection) -> Result<(), String> {
    let count = ChatMessage::count(conn).map_err(|e| format!("Database error: {}", e))?;
    if count == 0 {
        ChatMessage::append(conn, ChatRole::Assistant, GREETING)
            .map_err(|e| format!("Failed to seed greeting: {}", e))?;
    }
    Ok(())
}

/// Send a message to the assistant and get its reply.
///
/// Both sides of the exchange are appended to the stored transcript.
pub fn send_chat_message(db: &Database, content: &str) -> Result<SendChatResponse, String> {
    let content = content.trim();
    if content.is_empty() {
        return Err("Message must not be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    ensure_greeting(&conn)?;

    let profile = Profile::get(&conn).map_err(|e| format!("Failed to load profile: {}", e))?;
    let context = AssistantContext {
        target: profile.and_then(|p| p.target),
    };

    let user_message = ChatMessage::append(&conn, ChatRole::User, content)
        .map_err(|e| format!("Failed to store message: {}", e))?;

    let reply = generate_reply(content, &context);
    let assistant_message = ChatMessage::append(&conn, ChatRole::Assistant, &reply)
        .map_err(|e| format!("Failed to store reply: {}", e))?;

    Ok(SendChatResponse {
        user_message,
        assistant_message,
    })
}

/// Read the most recent messages, oldest first
pub fn get_chat_history(db: &Database, limit: i64) -> Result<ChatHistoryResponse, String> {
    let limit = limit.clamp(1, 500);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    ensure_greeting(&conn)?;

    let messages =
        ChatMessage::recent(&conn, limit).map_err(|e| format!("Failed to load history: {}", e))?;
    let total = ChatMessage::count(&conn).map_err(|e| format!("Database error: {}", e))?;

    Ok(ChatHistoryResponse {
        messages,
        total,
        quick_questions: QUICK_QUESTIONS.to_vec(),
    })
}

/// Wipe the transcript
pub fn clear_chat_history(db: &Database) -> Result<ClearChatResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = ChatMessage::clear(&conn).map_err(|e| format!("Failed to clear: {}", e))?;
    Ok(ClearChatResponse { deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::tools::profile::{complete_onboarding, sign_in, Session};

    fn test_db(name: &str) -> Database {
        let db = Database::new_in_memory(name).unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    #[test]
    fn test_exchange_is_persisted_with_greeting() {
        let db = test_db("chat_exchange");

        let response = send_chat_message(&db, "any snack ideas?").unwrap();
        assert_eq!(response.user_message.role, ChatRole::User);
        assert!(response.assistant_message.content.contains("Greek yogurt"));

        // greeting + user + assistant
        let history = get_chat_history(&db, 50).unwrap();
        assert_eq!(history.total, 3);
        assert_eq!(history.messages[0].content, GREETING);
    }

    #[test]
    fn test_calorie_answer_uses_stored_target() {
        let db = test_db("chat_target");

        let mut session = Session::new();
        sign_in(&db, &mut session, "ana@example.com", "Ana").unwrap();
        complete_onboarding(&db, &mut session, 30, 70.0, 175.0, "sedentary", "maintain").unwrap();

        let response = send_chat_message(&db, "how many calories should I eat?").unwrap();
        assert!(response.assistant_message.content.contains("2035"));
    }

    #[test]
    fn test_clear_resets_transcript() {
        let db = test_db("chat_clear");
        send_chat_message(&db, "hello").unwrap();

        let cleared = clear_chat_history(&db).unwrap();
        assert!(cleared.deleted >= 3);

        // greeting is reseeded on next read
        let history = get_chat_history(&db, 50).unwrap();
        assert_eq!(history.total, 1);
    }
}
