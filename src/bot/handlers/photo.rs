use teloxide::prelude::*;

use crate::bot::commands::add;
use crate::bot::handlers::{HandlerResult, PhotoAddArgs};
use crate::bot::BotContext;

/// Photo messages captioned with `/add <name> <days>`.
pub async fn photo_handler(bot: Bot, msg: Message, args: PhotoAddArgs, ctx: BotContext) -> HandlerResult {
    add::handle_photo_add(bot, msg, args.0, &ctx).await?;
    Ok(())
}
