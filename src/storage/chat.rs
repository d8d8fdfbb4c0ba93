use rusqlite::params;

use super::Database;
use super::database::{new_id, now_rfc3339};
use crate::types::{ChatMessage, ChatRole, ParseWithDefault, Result, log_filter_warn};

pub struct ChatStore<'a> {
    db: &'a Database,
}

impl<'a> ChatStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// The most recent `limit` messages, oldest first.
    pub fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, role, content, created_at FROM (
                SELECT rowid AS seq, id, user_id, role, content, created_at
                FROM chat_messages
                WHERE user_id = ?1
                ORDER BY created_at DESC, seq DESC
                LIMIT ?2
             ) ORDER BY created_at ASC, seq ASC",
        )?;
        let messages = stmt
            .query_map(params![user_id, limit as i64], |row| {
                let role: String = row.get(2)?;
                Ok(ChatMessage {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    role: ChatRole::parse_or_default(&role),
                    content: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .filter_map(|r| log_filter_warn(r, "reading chat message"))
            .collect();
        Ok(messages)
    }

    pub fn append(&self, user_id: &str, role: ChatRole, content: &str) -> Result<ChatMessage> {
        let message = ChatMessage {
            id: new_id(),
            user_id: user_id.to_string(),
            role,
            content: content.to_string(),
            created_at: now_rfc3339(),
        };

        self.db.execute(
            "INSERT INTO chat_messages (id, user_id, role, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            &[
                &message.id,
                &message.user_id,
                &message.role.as_str(),
                &message.content,
                &message.created_at,
            ],
        )?;

        Ok(message)
    }

    /// Remove the user's whole history; returns the number of messages deleted.
    pub fn clear(&self, user_id: &str) -> Result<usize> {
        self.db
            .execute("DELETE FROM chat_messages WHERE user_id = ?1", &[&user_id])
    }
}
