//! Chat Message model
//!
//! Persisted transcript of the assistant conversation.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub role: ChatRole,
    pub content: String,
    pub created_at: String,
}

impl ChatMessage {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let role_str: String = row.get("role")?;
        let role = ChatRole::parse(&role_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown chat role: {}", role_str).into(),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            role,
            content: row.get("content")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Append a message to the transcript
    pub fn append(conn: &Connection, role: ChatRole, content: &str) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO chat_messages (role, content) VALUES (?1, ?2)",
            params![role.as_str(), content],
        )?;

        let id = conn.last_insert_rowid();
        let mut stmt = conn.prepare("SELECT * FROM chat_messages WHERE id = ?1")?;
        Ok(stmt.query_row([id], Self::from_row)?)
    }

    /// The most recent messages, oldest first
    pub fn recent(conn: &Connection, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM (
                SELECT * FROM chat_messages ORDER BY id DESC LIMIT ?1
             ) ORDER BY id ASC",
        )?;

        let messages = stmt
            .query_map([limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    /// Count all messages
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM chat_messages", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete the whole transcript, returning how many rows went away
    pub fn clear(conn: &Connection) -> DbResult<i64> {
        let rows = conn.execute("DELETE FROM chat_messages", [])?;
        Ok(rows as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::test_support::memory_db;

    #[test]
    fn test_append_and_recent_ordering() {
        let conn = memory_db();

        ChatMessage::append(&conn, ChatRole::Assistant, "Hi! How can I help?").unwrap();
        ChatMessage::append(&conn, ChatRole::User, "How many calories should I eat?").unwrap();
        ChatMessage::append(&conn, ChatRole::Assistant, "About 2000 kcal.").unwrap();

        let recent = ChatMessage::recent(&conn, 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].role, ChatRole::User);
        assert_eq!(recent[1].role, ChatRole::Assistant);

        assert_eq!(ChatMessage::clear(&conn).unwrap(), 3);
        assert_eq!(ChatMessage::count(&conn).unwrap(), 0);
    }
}
