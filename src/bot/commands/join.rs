use teloxide::prelude::*;

use crate::bot::messages;
use crate::bot::{BotContext, Caller};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_error, log_command_start, log_command_success, log_validation_error};
use crate::utils::validation::validate_invite_code_input;

pub async fn handle_join(bot: Bot, msg: Message, raw_code: String, ctx: &BotContext) -> ResponseResult<()> {
    let Some(caller) = Caller::from_message(&msg) else {
        return Ok(());
    };
    log_command_start("join", caller.user_id, caller.chat_id, Some(&raw_code));

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    let code = match validate_invite_code_input(&raw_code) {
        Ok(code) => code,
        Err(e) => {
            log_validation_error("join", &raw_code, &e.to_string(), caller.user_id, caller.chat_id);
            feedback
                .validation_error(&e.to_string(), "Usage: /join <code>. Example: /join ABC234")
                .await?;
            return Ok(());
        }
    };

    match ctx.invites.use_code(&code, caller.user_id, caller.chat_id).await {
        Ok(outcome) => {
            log_command_success(
                "join",
                caller.user_id,
                caller.chat_id,
                Some(&format!("{} added, {} skipped", outcome.added.len(), outcome.skipped.len())),
            );
            feedback
                .send_html(messages::joined(&outcome.added, &outcome.skipped))
                .await?;
        }
        Err(e) => {
            log_command_error("join", caller.user_id, caller.chat_id, &e.to_string());
            feedback.send_html(messages::service_error(&e)).await?;
        }
    }

    Ok(())
}
