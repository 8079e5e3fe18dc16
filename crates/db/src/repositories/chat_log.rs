use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use teller_core::domain::session::Sender;

use super::{ChatLogRepository, ChatMessage, NewChatMessage, RepositoryError};
use crate::DbPool;

/// SQLite-backed chat log.
pub struct SqlChatLogRepository {
    pool: DbPool,
}

impl SqlChatLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ChatLogRepository for SqlChatLogRepository {
    async fn append(&self, message: NewChatMessage) -> Result<ChatMessage, RepositoryError> {
        let result = sqlx::query("INSERT INTO chat (sender, message, timestamp) VALUES (?, ?, ?)")
            .bind(message.sender.as_str())
            .bind(&message.message)
            .bind(&message.timestamp)
            .execute(&self.pool)
            .await?;

        Ok(ChatMessage {
            id: result.last_insert_rowid(),
            sender: message.sender.as_str().to_string(),
            message: message.message,
            timestamp: message.timestamp,
        })
    }

    async fn history(&self) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query("SELECT id, sender, message, timestamp FROM chat ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(chat_message_from_row).collect()
    }
}

fn chat_message_from_row(row: &SqliteRow) -> Result<ChatMessage, RepositoryError> {
    let sender: String = row.try_get("sender")?;
    if ![Sender::You.as_str(), Sender::Bot.as_str()].contains(&sender.as_str()) {
        return Err(RepositoryError::Decode(format!("invalid chat sender: {sender}")));
    }

    Ok(ChatMessage {
        id: row.try_get("id")?,
        sender,
        message: row.try_get("message")?,
        timestamp: row.try_get("timestamp")?,
    })
}
