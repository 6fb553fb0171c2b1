use teloxide::prelude::*;

use crate::bot::commands::list::select_plant;
use crate::bot::messages;
use crate::bot::{BotContext, Caller};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_error, log_command_start, log_command_success};

pub async fn handle_share(bot: Bot, msg: Message, number: String, ctx: &BotContext) -> ResponseResult<()> {
    let Some(caller) = Caller::from_message(&msg) else {
        return Ok(());
    };
    log_command_start("share", caller.user_id, caller.chat_id, Some(&number));

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
    let Some(plant) = select_plant(&feedback, ctx, caller, "share", &number).await? else {
        return Ok(());
    };

    match ctx.invites.create(&plant.id, caller.user_id).await {
        Ok(grant) => {
            log_command_success("share", caller.user_id, caller.chat_id, Some(&grant.code));
            feedback
                .send_html(messages::invite_created(Some(&plant.name), &grant))
                .await?;
        }
        Err(e) => {
            log_command_error("share", caller.user_id, caller.chat_id, &e.to_string());
            feedback.send_html(messages::service_error(&e)).await?;
        }
    }

    Ok(())
}

pub async fn handle_share_all(bot: Bot, msg: Message, ctx: &BotContext) -> ResponseResult<()> {
    let Some(caller) = Caller::from_message(&msg) else {
        return Ok(());
    };
    log_command_start("shareall", caller.user_id, caller.chat_id, None);

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    match ctx.invites.create_all(caller.user_id).await {
        Ok(grant) => {
            log_command_success(
                "shareall",
                caller.user_id,
                caller.chat_id,
                Some(&format!("{} for {} plants", grant.code, grant.plant_count)),
            );
            feedback
                .send_html(messages::invite_created(None, &grant))
                .await?;
        }
        Err(e) => {
            log_command_error("shareall", caller.user_id, caller.chat_id, &e.to_string());
            feedback.send_html(messages::service_error(&e)).await?;
        }
    }

    Ok(())
}
