//! Store error types.

/// Store operation errors
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// IO error while reading or writing the store file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Store document could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another user already registered this email (case-insensitive)
    #[error("Email already registered: {0}")]
    EmailTaken(String),
}

/// Result type alias for store operations
pub type DbResult<T> = Result<T, DbError>;
