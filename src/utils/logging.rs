use tracing::{error, info, warn};

/// Logs command start with consistent format
pub fn log_command_start(command: &str, user_id: i64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("CMD_START: {} by {} in chat {} - {}", command, user_id, chat_id, d),
        None => info!("CMD_START: {} by {} in chat {}", command, user_id, chat_id),
    }
}

/// Logs command completion with consistent format
pub fn log_command_success(command: &str, user_id: i64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("CMD_SUCCESS: {} by {} in chat {} - {}", command, user_id, chat_id, d),
        None => info!("CMD_SUCCESS: {} by {} in chat {}", command, user_id, chat_id),
    }
}

/// Logs command errors with consistent format
pub fn log_command_error(command: &str, user_id: i64, chat_id: i64, error: &str) {
    error!("CMD_ERROR: {} by {} in chat {} - {}", command, user_id, chat_id, error);
}

/// Logs rejected user input
pub fn log_validation_error(command: &str, value: &str, error: &str, user_id: i64, chat_id: i64) {
    warn!(
        "VALIDATION_ERROR: {} - input '{}' invalid: {} - user {} in chat {}",
        command, value, error, user_id, chat_id
    );
}

/// Logs database errors outside a command, e.g. in the reminder job
pub fn log_database_error(operation: &str, error: &str) {
    error!("DB_ERROR: {} - {}", operation, error);
}

/// Logs a reminder that could not be delivered to one chat
pub fn log_delivery_failure(plant_id: &str, chat_id: i64, error: &str) {
    warn!("DELIVERY_FAILED: plant {} to chat {} - {}", plant_id, chat_id, error);
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
