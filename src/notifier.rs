//! Delivery of notification text to the configured Telegram chat.
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("telegram delivery failed: {0}")]
    Delivery(#[from] teloxide::RequestError),
    #[error("destination rejected: {0}")]
    BadDestination(String),
}

/// Seam between the poll loop and the real Telegram bot; tests substitute
/// recording fakes.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<(), NotifyError>;
}

#[derive(Debug)]
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(token: &str, chat_id: &str) -> Result<Self, NotifyError> {
        let chat_id = chat_id
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| NotifyError::BadDestination(chat_id.to_string()))?;
        Ok(Self {
            bot: Bot::new(token),
            chat_id,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let res = self.bot.send_message(self.chat_id, text).await;
        debug!(ok = res.is_ok(), "telegram delivery attempted");
        res.map(|_| ()).map_err(NotifyError::from)
    }
}
