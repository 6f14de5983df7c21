use tracing::{error, info, warn};

/// Logs command start with consistent format
pub fn log_command_start(command: &str, user: &str, user_id: i64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!(
            "CMD_START: {} by {}({}) in chat {} - {}",
            command, user, user_id, chat_id, d
        ),
        None => info!(
            "CMD_START: {} by {}({}) in chat {}",
            command, user, user_id, chat_id
        ),
    }
}

/// Logs command completion with consistent format
pub fn log_command_success(command: &str, user_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("CMD_SUCCESS: {} for user {} - {}", command, user_id, d),
        None => info!("CMD_SUCCESS: {} for user {}", command, user_id),
    }
}

/// Logs command errors with consistent format
pub fn log_command_error(command: &str, user_id: i64, error: &str) {
    error!("CMD_ERROR: {} for user {} - {}", command, user_id, error);
}

/// Logs rejected user input with consistent format
pub fn log_validation_error(stage: &str, value: &str, error: &str, user_id: i64) {
    warn!(
        "VALIDATION_ERROR: {} input '{}' invalid: {} - user {}",
        stage, value, error, user_id
    );
}

/// Logs database errors with consistent format
pub fn log_database_error(operation: &str, table: &str, error: &str) {
    error!("DB_ERROR: {} on {} failed: {}", operation, table, error);
}

/// Logs scheduler lifecycle and firing events with consistent format
pub fn log_scheduler_event(event: &str, event_id: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SCHEDULER: {} {} - {}", event, event_id, d),
        None => info!("SCHEDULER: {} {}", event, event_id),
    }
}

/// Logs scheduler failures; the driver keeps running after these
pub fn log_scheduler_failure(event: &str, event_id: &str, error: &str) {
    error!("SCHEDULER: {} {} failed: {}", event, event_id, error);
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
