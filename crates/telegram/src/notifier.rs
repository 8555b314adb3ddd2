use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, Recipient};
use tracing::debug;

use common::{Error, Notifier, Result};

/// Sends alerts to one Telegram chat through the Bot API (HTML parse mode).
pub struct TelegramNotifier {
    bot: Bot,
    recipient: Recipient,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat: &str) -> Self {
        Self {
            bot: Bot::new(token),
            recipient: parse_recipient(chat),
        }
    }

    pub fn recipient(&self) -> &Recipient {
        &self.recipient
    }
}

/// Numeric ids address a chat directly; anything else is taken as a
/// `@channel` username.
pub fn parse_recipient(chat: &str) -> Recipient {
    let chat = chat.trim();
    match chat.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(chat.to_string()),
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        self.bot
            .send_message(self.recipient.clone(), text)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| Error::Delivery(e.to_string()))?;
        debug!(recipient = ?self.recipient, "Alert delivered to Telegram");
        Ok(())
    }
}
