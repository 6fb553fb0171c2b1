//! # Watering Reminder Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database,
//! starts the reminder service and the HTTP server, and runs the Telegram bot.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use watering_reminder_bot::bot::commands::Command;
use watering_reminder_bot::bot::handlers::BotHandler;
use watering_reminder_bot::bot::BotContext;
use watering_reminder_bot::config::Config;
use watering_reminder_bot::database::connection::DatabaseManager;
use watering_reminder_bot::services::clock::{Clock, SystemClock};
use watering_reminder_bot::services::health::HealthService;
use watering_reminder_bot::services::images::ImageStore;
use watering_reminder_bot::services::invites::InviteService;
use watering_reminder_bot::services::notifier::TelegramNotifier;
use watering_reminder_bot::services::registry::PlantRegistry;
use watering_reminder_bot::services::reminder::{ReminderChecker, ReminderService};
use watering_reminder_bot::services::watering::WateringSchedule;
use watering_reminder_bot::utils::logging::log_system_event;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watering_reminder_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Watering Reminder Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, Timezone: {}, Watering hour: {}",
        config.database_url, config.http_port, config.reminder_timezone, config.watering_hour
    );

    // Initialize database
    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    db_manager.run_migrations().await?;
    info!("Database initialized successfully");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let images = ImageStore::new(
        db_manager.pool.clone(),
        &config.public_base_url,
        config.max_image_bytes,
        clock.clone(),
    );
    let schedule = WateringSchedule::new(config.reminder_timezone, config.watering_hour);
    let registry = PlantRegistry::new(db_manager.clone(), images.clone(), schedule, clock.clone());
    let invites = InviteService::new(db_manager.clone(), clock.clone());

    // Initialize bot
    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        tracing::warn!("Failed to register bot commands: {}", e);
    }
    let handler = BotHandler::new(BotContext::new(registry.clone(), invites));
    info!("Telegram bot initialized successfully");

    // Initialize and start reminder service
    let checker = ReminderChecker::new(
        db_manager.clone(),
        registry,
        Arc::new(TelegramNotifier::new(bot.clone())),
        clock,
    );
    let mut reminder_service = ReminderService::new(
        checker,
        Duration::from_secs(config.reminder_interval_secs),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create reminder service: {}", e))?;

    if let Err(e) = reminder_service.start().await {
        tracing::error!("Failed to start reminder service: {}", e);
    }

    // HTTP server: health probes and images
    let health_service = HealthService::new(db_manager.clone(), &images);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("HTTP server starting on port {}", config.http_port);
    log_system_event("startup", Some(&format!("images served from {}", config.public_base_url)));

    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let http_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    // Either task finishing means shutdown
    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = http_task => {
            if let Err(e) = result {
                tracing::error!("HTTP task error: {}", e);
            }
        }
    }

    if let Err(e) = reminder_service.stop().await {
        tracing::warn!("Error stopping reminder service: {}", e);
    }

    log_system_event("shutdown", None);
    Ok(())
}
