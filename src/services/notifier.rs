use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::InputFile;

/// Outbound channel for reminder messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;

    async fn send_photo(&self, chat_id: i64, photo: &[u8], caption: &str) -> anyhow::Result<()>;
}

/// Delivers reminders through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, photo: &[u8], caption: &str) -> anyhow::Result<()> {
        let file = InputFile::memory(photo.to_vec()).file_name("plant.jpg");
        self.bot
            .send_photo(ChatId(chat_id), file)
            .caption(caption)
            .await?;
        Ok(())
    }
}
