pub mod general_message;
pub mod message;
pub mod photo;

use teloxide::{dispatching::UpdateHandler, prelude::*, types::Me};

use crate::bot::commands::Command;
use crate::bot::BotContext;
use crate::utils::validation::add_command_args;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

/// Arguments of an `/add` command sent as a photo caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAddArgs(pub String);

pub struct BotHandler {
    pub ctx: BotContext,
}

impl BotHandler {
    pub fn new(ctx: BotContext) -> Self {
        Self { ctx }
    }

    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        let ctx_command = self.ctx.clone();
        let ctx_photo = self.ctx.clone();

        Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let ctx = ctx_command.clone();
                        async move { message::command_handler(bot, msg, cmd, ctx).await }
                    }),
            )
            .branch(
                dptree::filter_map(|msg: Message| {
                    msg.photo()?;
                    let args = add_command_args(msg.caption()?)?;
                    Some(PhotoAddArgs(args.to_string()))
                })
                .endpoint(move |bot: Bot, msg: Message, args: PhotoAddArgs| {
                    let ctx = ctx_photo.clone();
                    async move { photo::photo_handler(bot, msg, args, ctx).await }
                }),
            )
            .branch(dptree::endpoint(|bot: Bot, msg: Message, me: Me| async move {
                general_message::handle_general_message(bot, msg, me).await
            }))
    }
}
