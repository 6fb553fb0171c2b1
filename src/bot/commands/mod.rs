pub mod add;
pub mod delete;
pub mod join;
pub mod list;
pub mod share;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Watering Reminder commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Add a plant: /add <name> <days>, attach a photo to include an image")]
    Add(String),
    #[command(description = "Show your plants")]
    List,
    #[command(description = "Delete a plant: /delete <number>")]
    Delete(String),
    #[command(description = "Delete all your plants")]
    ClearAll,
    #[command(description = "Share a plant: /share <number>")]
    Share(String),
    #[command(description = "Share all your plants")]
    ShareAll,
    #[command(description = "Join shared plants: /join <code>")]
    Join(String),
    #[command(description = "Remove a plant's photo: /removephoto <number>")]
    RemovePhoto(String),
}
