//! # Watering Reminder Bot
//!
//! A Telegram bot that reminds people to water their plants.
//!
//! ## Features
//! - Register plants with a watering interval and an optional photo
//! - Reminders at a fixed local hour, re-armed after every reminder
//! - Share plants with other users through short-lived invite codes
//! - Plant photos stored in SQLite and served over HTTP

/// Bot command handlers and message processing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Error type shared by the services
pub mod error;
/// Plant registry, invites, reminders, images and the HTTP surface
pub mod services;
/// Utility functions for datetime, validation, and formatting
pub mod utils;
