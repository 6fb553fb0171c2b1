use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::{add, delete, join, list, share, Command};
use crate::bot::handlers::HandlerResult;
use crate::bot::messages;
use crate::bot::BotContext;

pub async fn command_handler(bot: Bot, msg: Message, cmd: Command, ctx: BotContext) -> HandlerResult {
    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string()).await?;
        }
        Command::Start => {
            bot.send_message(msg.chat.id, messages::START_TEXT)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Add(args) => add::handle_add(bot, msg, args, &ctx).await?,
        Command::List => list::handle_list(bot, msg, &ctx).await?,
        Command::Delete(number) => delete::handle_delete(bot, msg, number, &ctx).await?,
        Command::ClearAll => delete::handle_clear_all(bot, msg, &ctx).await?,
        Command::Share(number) => share::handle_share(bot, msg, number, &ctx).await?,
        Command::ShareAll => share::handle_share_all(bot, msg, &ctx).await?,
        Command::Join(code) => join::handle_join(bot, msg, code, &ctx).await?,
        Command::RemovePhoto(number) => delete::handle_remove_photo(bot, msg, number, &ctx).await?,
    }
    Ok(())
}
