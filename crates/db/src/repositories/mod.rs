use async_trait::async_trait;
use chrono::Local;
use serde::Serialize;
use thiserror::Error;

use teller_core::domain::session::Sender;

pub mod chat_log;
pub mod memory;

pub use chat_log::SqlChatLogRepository;
pub use memory::InMemoryChatLogRepository;

/// Timestamp layout of every persisted chat row.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// A chat row as stored, with its assigned rowid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: i64,
    pub sender: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewChatMessage {
    pub sender: Sender,
    pub message: String,
    pub timestamp: String,
}

impl NewChatMessage {
    /// Stamp a message with the current wall-clock time.
    pub fn now(sender: Sender, message: impl Into<String>) -> Self {
        Self {
            sender,
            message: message.into(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Append-only log of user and assistant messages. Rows are never rewritten;
/// insertion order is the display order.
#[async_trait]
pub trait ChatLogRepository: Send + Sync {
    async fn append(&self, message: NewChatMessage) -> Result<ChatMessage, RepositoryError>;
    async fn history(&self) -> Result<Vec<ChatMessage>, RepositoryError>;
}
