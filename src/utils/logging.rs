use tracing::{debug, error, info, warn};

/// Logs the start of inbound event processing with a consistent format
pub fn log_event_start(kind: &str, user_id: i64, details: &str) {
    info!("EVENT_START: {} from user {} - {}", kind, user_id, details);
}

/// Logs the outcome of inbound event processing
pub fn log_event_done(kind: &str, user_id: i64, replies: usize) {
    debug!("EVENT_DONE: {} from user {} - {} replies", kind, user_id, replies);
}

/// Logs event processing failures
pub fn log_event_error(kind: &str, user_id: i64, error: &str) {
    error!("EVENT_ERROR: {} from user {} - {}", kind, user_id, error);
}

/// Logs storage operations with a consistent format
pub fn log_store_operation(operation: &str, user_id: i64) {
    debug!("STORE_OP: {} for user {}", operation, user_id);
}

/// Logs storage errors with a consistent format
pub fn log_store_error(operation: &str, user_id: i64, error: &str) {
    error!("STORE_ERROR: {} for user {} failed: {}", operation, user_id, error);
}

/// Logs outbound delivery failures; delivery errors never stop the bot
pub fn log_transport_error(operation: &str, user_id: i64, error: &str) {
    error!("TRANSPORT_ERROR: {} to user {} failed: {}", operation, user_id, error);
}

/// Logs a degraded environmental lookup
pub fn log_environment_degraded(city: &str, error: &str) {
    warn!("ENV_DEGRADED: lookup for '{}' failed, using placeholder reading: {}", city, error);
}
