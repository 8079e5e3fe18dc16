use tokio::sync::RwLock;

use super::{ChatLogRepository, ChatMessage, NewChatMessage, RepositoryError};

/// Chat log held in process memory. Used by tests and by surfaces that run
/// without a database.
#[derive(Default)]
pub struct InMemoryChatLogRepository {
    messages: RwLock<Vec<ChatMessage>>,
}

#[async_trait::async_trait]
impl ChatLogRepository for InMemoryChatLogRepository {
    async fn append(&self, message: NewChatMessage) -> Result<ChatMessage, RepositoryError> {
        let mut messages = self.messages.write().await;
        let stored = ChatMessage {
            id: messages.len() as i64 + 1,
            sender: message.sender.as_str().to_string(),
            message: message.message,
            timestamp: message.timestamp,
        };
        messages.push(stored.clone());
        Ok(stored)
    }

    async fn history(&self) -> Result<Vec<ChatMessage>, RepositoryError> {
        Ok(self.messages.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use teller_core::domain::session::Sender;

    use crate::repositories::{ChatLogRepository, InMemoryChatLogRepository, NewChatMessage};

    #[tokio::test]
    async fn in_memory_chat_log_round_trip() {
        let repo = InMemoryChatLogRepository::default();

        let user = repo
            .append(NewChatMessage::now(Sender::You, "suggest a loan"))
            .await
            .expect("append user row");
        let bot = repo
            .append(NewChatMessage::now(Sender::Bot, "🔒 Please login as customer to get recommendations."))
            .await
            .expect("append bot row");

        assert_eq!(user.id, 1);
        assert_eq!(bot.id, 2);
        assert_eq!(repo.history().await.expect("history"), vec![user, bot]);
    }
}
