use teloxide::prelude::*;

use crate::bot::commands::list::select_plant;
use crate::bot::messages;
use crate::bot::{BotContext, Caller};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_error, log_command_start, log_command_success};

pub async fn handle_delete(bot: Bot, msg: Message, number: String, ctx: &BotContext) -> ResponseResult<()> {
    let Some(caller) = Caller::from_message(&msg) else {
        return Ok(());
    };
    log_command_start("delete", caller.user_id, caller.chat_id, Some(&number));

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
    let Some(plant) = select_plant(&feedback, ctx, caller, "delete", &number).await? else {
        return Ok(());
    };

    match ctx.registry.remove(&plant.id, caller.user_id).await {
        Ok(outcome) => {
            let details = if outcome.plant_deleted { "plant deleted" } else { "relationship removed" };
            log_command_success("delete", caller.user_id, caller.chat_id, Some(details));
            feedback.send_html(messages::plant_removed(&plant.name, outcome)).await?;
        }
        Err(e) => {
            log_command_error("delete", caller.user_id, caller.chat_id, &e.to_string());
            feedback.send_html(messages::service_error(&e)).await?;
        }
    }

    Ok(())
}

pub async fn handle_clear_all(bot: Bot, msg: Message, ctx: &BotContext) -> ResponseResult<()> {
    let Some(caller) = Caller::from_message(&msg) else {
        return Ok(());
    };
    log_command_start("clearall", caller.user_id, caller.chat_id, None);

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    match ctx.registry.clear_all(caller.user_id).await {
        Ok(count) => {
            log_command_success("clearall", caller.user_id, caller.chat_id, Some(&format!("{count} removed")));
            feedback.send_html(messages::cleared(count)).await?;
        }
        Err(e) => {
            log_command_error("clearall", caller.user_id, caller.chat_id, &e.to_string());
            feedback.send_html(messages::service_error(&e)).await?;
        }
    }

    Ok(())
}

pub async fn handle_remove_photo(bot: Bot, msg: Message, number: String, ctx: &BotContext) -> ResponseResult<()> {
    let Some(caller) = Caller::from_message(&msg) else {
        return Ok(());
    };
    log_command_start("removephoto", caller.user_id, caller.chat_id, Some(&number));

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
    let Some(plant) = select_plant(&feedback, ctx, caller, "removephoto", &number).await? else {
        return Ok(());
    };

    match ctx.registry.remove_image(&plant.id, caller.user_id).await {
        Ok(removed) => {
            log_command_success("removephoto", caller.user_id, caller.chat_id, None);
            feedback.send_html(messages::photo_removed(&plant.name, removed)).await?;
        }
        Err(e) => {
            log_command_error("removephoto", caller.user_id, caller.chat_id, &e.to_string());
            feedback.send_html(messages::service_error(&e)).await?;
        }
    }

    Ok(())
}
