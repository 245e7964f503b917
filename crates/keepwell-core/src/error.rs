use thiserror::Error;

/// Error kinds shared by the save service, pipeline, and clustering engine.
///
/// The HTTP layer maps each variant to a status code (see `keepwell-server`);
/// job handlers instead record the `Display` text onto the owning
/// `ProcessingJob` row and let the queue redeliver.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("external provider unavailable: {0}")]
    UnavailableExternal(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => CoreError::NotFound("row not found".to_string()),
            other => CoreError::Internal(other.to_string()),
        }
    }
}

impl From<ai_client::AiError> for CoreError {
    fn from(err: ai_client::AiError) -> Self {
        match err {
            ai_client::AiError::RateLimited { retry_after_secs } => {
                CoreError::RateLimited { retry_after_secs }
            }
            other => CoreError::UnavailableExternal(other.to_string()),
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
