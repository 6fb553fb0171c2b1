use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};
use crate::utils::html::{bold, escape_html};

/// Feedback types for different command outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackType {
    Success,
    Warning,
    Error,
    Processing,
}

impl FeedbackType {
    fn emoji(&self) -> &'static str {
        match self {
            FeedbackType::Success => "✅",
            FeedbackType::Warning => "⚠️",
            FeedbackType::Error => "❌",
            FeedbackType::Processing => "⏳",
        }
    }
}

/// Prefixes plain text with the feedback emoji and escapes it for HTML mode.
pub fn format_feedback(feedback_type: FeedbackType, message: &str) -> String {
    format!("{} {}", feedback_type.emoji(), escape_html(message))
}

/// Formats an error with a follow-up hint on how to fix the input.
pub fn format_validation_error(error: &str, suggestion: &str) -> String {
    format!(
        "{}\n\n💡 {} {}",
        format_feedback(FeedbackType::Error, error),
        bold("Suggestion:"),
        escape_html(suggestion)
    )
}

/// Centralized feedback system for bot commands
pub struct CommandFeedback {
    bot: Bot,
    chat_id: ChatId,
}

impl CommandFeedback {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    /// Send plain text with a feedback emoji
    pub async fn send(&self, feedback_type: FeedbackType, message: &str) -> ResponseResult<Message> {
        self.send_html(format_feedback(feedback_type, message)).await
    }

    /// Send a message that is already valid Telegram HTML
    pub async fn send_html(&self, html: String) -> ResponseResult<Message> {
        self.bot
            .send_message(self.chat_id, html)
            .parse_mode(ParseMode::Html)
            .await
    }

    /// Send a processing message that can be updated later
    pub async fn send_processing(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Processing, message).await
    }

    /// Replace an earlier message, typically a processing notice
    pub async fn update_message(
        &self,
        message_id: MessageId,
        feedback_type: FeedbackType,
        message: &str,
    ) -> ResponseResult<Message> {
        self.bot
            .edit_message_text(self.chat_id, message_id, format_feedback(feedback_type, message))
            .parse_mode(ParseMode::Html)
            .await
    }

    pub async fn error(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Error, message).await
    }

    /// Send validation error with helpful suggestion
    pub async fn validation_error(&self, error: &str, suggestion: &str) -> ResponseResult<Message> {
        self.send_html(format_validation_error(error, suggestion)).await
    }
}
