pub mod clock;
pub mod health;
pub mod images;
pub mod invites;
pub mod notifier;
pub mod registry;
pub mod reminder;
pub mod watering;
