use anyhow::anyhow;
use teloxide::net::Download;
use teloxide::prelude::*;

use crate::bot::messages::{self, PhotoStatus};
use crate::bot::{BotContext, Caller};
use crate::services::registry::NewPlant;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_error, log_command_start, log_command_success, log_validation_error};
use crate::utils::validation::{parse_add_args, validate_telegram_chat_id};

pub async fn handle_add(
    bot: Bot,
    msg: Message,
    args: String,
    ctx: &BotContext,
) -> ResponseResult<()> {
    let Some(caller) = Caller::from_message(&msg) else {
        return Ok(());
    };
    log_command_start("add", caller.user_id, caller.chat_id, Some(&args));

    let Some((name, interval_days)) = parse_or_explain(&bot, &msg, &args, caller).await? else {
        return Ok(());
    };

    create_plant(&bot, &msg, ctx, caller, name, interval_days, None, PhotoStatus::None).await
}

/// `/add <name> <days>` sent as a photo caption.
pub async fn handle_photo_add(
    bot: Bot,
    msg: Message,
    args: String,
    ctx: &BotContext,
) -> ResponseResult<()> {
    let Some(caller) = Caller::from_message(&msg) else {
        return Ok(());
    };
    log_command_start("add (photo)", caller.user_id, caller.chat_id, Some(&args));

    let Some((name, interval_days)) = parse_or_explain(&bot, &msg, &args, caller).await? else {
        return Ok(());
    };

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
    let processing = feedback.send_processing("Uploading photo...").await?;

    let upload = async {
        let max_bytes = ctx.registry.images().max_bytes();
        let data = download_largest_photo(&bot, &msg, max_bytes).await?;
        ctx.registry
            .images()
            .store(data, None)
            .await
            .map_err(anyhow::Error::from)
    };

    let (image_id, photo_status) = match upload.await {
        Ok(image_id) => (Some(image_id), PhotoStatus::Attached),
        Err(e) => {
            log_command_error("add (photo)", caller.user_id, caller.chat_id, &format!("photo upload failed: {e}"));
            (None, PhotoStatus::UploadFailed)
        }
    };

    let (status_type, status_text) = messages::photo_upload_notice(photo_status);
    if let Err(e) = feedback.update_message(processing.id, status_type, status_text).await {
        tracing::debug!("Could not update processing message: {}", e);
    }

    create_plant(&bot, &msg, ctx, caller, name, interval_days, image_id, photo_status).await
}

async fn parse_or_explain(
    bot: &Bot,
    msg: &Message,
    args: &str,
    caller: Caller,
) -> ResponseResult<Option<(String, i64)>> {
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    if let Err(e) = validate_telegram_chat_id(caller.chat_id) {
        log_validation_error("add", &caller.chat_id.to_string(), &e.to_string(), caller.user_id, caller.chat_id);
        feedback.error(&format!("Invalid chat: {e}")).await?;
        return Ok(None);
    }

    match parse_add_args(args) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            log_validation_error("add", args, &e.to_string(), caller.user_id, caller.chat_id);
            let error = if args.trim().is_empty() {
                messages::ADD_USAGE.to_string()
            } else {
                e.to_string()
            };
            feedback.validation_error(&error, messages::ADD_EXAMPLE).await?;
            Ok(None)
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn create_plant(
    bot: &Bot,
    msg: &Message,
    ctx: &BotContext,
    caller: Caller,
    name: String,
    interval_days: i64,
    image_id: Option<String>,
    photo_status: PhotoStatus,
) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    let new_plant = NewPlant {
        chat_id: caller.chat_id,
        user_id: caller.user_id,
        name,
        interval_days,
        image_id,
    };

    match ctx.registry.add(new_plant).await {
        Ok(plant) => {
            log_command_success("add", caller.user_id, caller.chat_id, Some(&plant.id));
            let schedule = ctx.registry.schedule();
            feedback
                .send_html(messages::plant_added(
                    &plant.name,
                    plant.interval_days,
                    photo_status,
                    &plant.next_watering_at(),
                    schedule.timezone(),
                ))
                .await?;
        }
        Err(e) => {
            log_command_error("add", caller.user_id, caller.chat_id, &e.to_string());
            feedback.send_html(messages::service_error(&e)).await?;
        }
    }

    Ok(())
}

/// Downloads the highest resolution version of the message's photo.
async fn download_largest_photo(bot: &Bot, msg: &Message, max_bytes: usize) -> anyhow::Result<Vec<u8>> {
    let photo = msg
        .photo()
        .and_then(|sizes| sizes.last())
        .ok_or_else(|| anyhow!("message has no photo"))?;

    if photo.file.size as usize > max_bytes {
        return Err(anyhow!("photo is too large ({} bytes)", photo.file.size));
    }

    let file = bot.get_file(photo.file.id.clone()).await?;
    let mut data = Vec::with_capacity(photo.file.size as usize);
    bot.download_file(&file.path, &mut data).await?;

    Ok(data)
}
