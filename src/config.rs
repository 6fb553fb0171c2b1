use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/plants.db";
const DEFAULT_TIMEZONE: &str = "Europe/Amsterdam";
const DEFAULT_WATERING_HOUR: u32 = 19;
const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 30;
const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    /// Base used to derive image URLs, without a trailing slash.
    pub public_base_url: String,
    pub reminder_timezone: Tz,
    pub watering_hour: u32,
    pub reminder_interval_secs: u64,
    pub max_image_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let database_url = Self::database_url_from_env();

        let port_str = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string());
        let http_port: u16 = port_str.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let public_base_url = non_empty_var("PUBLIC_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://localhost:{http_port}"));

        let timezone_name = non_empty_var("REMINDER_TIMEZONE")
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let reminder_timezone: Tz = timezone_name.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid REMINDER_TIMEZONE: {}", timezone_name))?;

        let watering_hour = match non_empty_var("WATERING_HOUR") {
            Some(value) => value.trim()
                .parse::<u32>()
                .ok()
                .filter(|hour| *hour < 24)
                .ok_or_else(|| anyhow!("Invalid WATERING_HOUR (expected 0-23)"))?,
            None => DEFAULT_WATERING_HOUR,
        };

        let reminder_interval_secs = match non_empty_var("REMINDER_INTERVAL_SECS") {
            Some(value) => value.trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| anyhow!("Invalid REMINDER_INTERVAL_SECS"))?,
            None => DEFAULT_REMINDER_INTERVAL_SECS,
        };

        let max_image_bytes = match non_empty_var("MAX_IMAGE_BYTES") {
            Some(value) => value.trim()
                .parse::<usize>()
                .ok()
                .filter(|bytes| *bytes > 0)
                .ok_or_else(|| anyhow!("Invalid MAX_IMAGE_BYTES"))?,
            None => DEFAULT_MAX_IMAGE_BYTES,
        };

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            http_port,
            public_base_url,
            reminder_timezone,
            watering_hour,
            reminder_interval_secs,
            max_image_bytes,
        })
    }

    /// `DATABASE_URL` or the default SQLite file. Needs no bot token, so the
    /// migrate tool can use it on its own.
    pub fn database_url_from_env() -> String {
        non_empty_var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
