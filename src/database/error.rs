use thiserror::Error;

/// Failures of the durable user store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to encode or decode user data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read legacy import file: {0}")]
    Io(#[from] std::io::Error),
}
