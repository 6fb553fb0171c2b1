use teloxide::prelude::*;
use teloxide::types::Me;

use crate::bot::handlers::HandlerResult;
use crate::utils::feedback::CommandFeedback;

/// Plain messages that didn't match a command.
///
/// Only text that looks like a command gets an answer so ordinary group
/// chatter stays unanswered.
pub async fn handle_general_message(bot: Bot, msg: Message, me: Me) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if let Some(command) = unknown_command(text, me.username()) {
        let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
        let error_msg = format!("Unknown command: {command}");
        feedback
            .validation_error(&error_msg, "Use /help to see all available commands.")
            .await?;
    }

    Ok(())
}

/// The command word of `text`, unless it is addressed to another bot.
fn unknown_command<'a>(text: &'a str, bot_username: &str) -> Option<&'a str> {
    let first = text.split_whitespace().next()?;
    if !first.starts_with('/') {
        return None;
    }

    match first.split_once('@') {
        Some((_, addressee)) if !addressee.eq_ignore_ascii_case(bot_username) => None,
        _ => Some(first),
    }
}
