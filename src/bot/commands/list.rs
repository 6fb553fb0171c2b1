use teloxide::prelude::*;

use crate::bot::messages;
use crate::bot::{BotContext, Caller};
use crate::database::models::Plant;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_error, log_command_start, log_command_success, log_validation_error};
use crate::utils::validation::parse_plant_number;

pub async fn handle_list(bot: Bot, msg: Message, ctx: &BotContext) -> ResponseResult<()> {
    let Some(caller) = Caller::from_message(&msg) else {
        return Ok(());
    };
    log_command_start("list", caller.user_id, caller.chat_id, None);

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    match ctx.registry.list(caller.user_id).await {
        Ok(plants) => {
            log_command_success("list", caller.user_id, caller.chat_id, Some(&format!("{} plants", plants.len())));
            let tz = ctx.registry.schedule().timezone();
            feedback.send_html(messages::plant_list(&plants, tz)).await?;
        }
        Err(e) => {
            log_command_error("list", caller.user_id, caller.chat_id, &e.to_string());
            feedback.send_html(messages::service_error(&e)).await?;
        }
    }

    Ok(())
}

/// Looks up the plant a user means by its number in `/list`.
///
/// Replies with the problem and returns `None` if the number doesn't
/// point at one of the user's plants.
pub async fn select_plant(
    feedback: &CommandFeedback,
    ctx: &BotContext,
    caller: Caller,
    command: &str,
    raw_number: &str,
) -> ResponseResult<Option<Plant>> {
    let plants = match ctx.registry.list(caller.user_id).await {
        Ok(plants) => plants,
        Err(e) => {
            log_command_error(command, caller.user_id, caller.chat_id, &e.to_string());
            feedback.send_html(messages::service_error(&e)).await?;
            return Ok(None);
        }
    };

    match parse_plant_number(raw_number, plants.len()) {
        Ok(index) => Ok(plants.into_iter().nth(index)),
        Err(e) => {
            log_validation_error(command, raw_number, &e.to_string(), caller.user_id, caller.chat_id);
            let suggestion = format!("Use /list to see your plants, then /{command} <number>. Example: /{command} 1");
            feedback.validation_error(&e.to_string(), &suggestion).await?;
            Ok(None)
        }
    }
}
