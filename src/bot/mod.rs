pub mod commands;
pub mod handlers;
pub mod messages;

use teloxide::types::Message;

use crate::services::invites::InviteService;
use crate::services::registry::PlantRegistry;

/// Services shared by every update handler.
#[derive(Clone)]
pub struct BotContext {
    pub registry: PlantRegistry,
    pub invites: InviteService,
}

impl BotContext {
    pub fn new(registry: PlantRegistry, invites: InviteService) -> Self {
        Self { registry, invites }
    }
}

/// Who sent a message and where to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub chat_id: i64,
}

impl Caller {
    /// `None` for messages without a sender, such as channel posts.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let user = msg.from()?;
        Some(Self {
            user_id: user.id.0 as i64,
            chat_id: msg.chat.id.0,
        })
    }
}
