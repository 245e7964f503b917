use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorIndexError>;

#[derive(Debug, Error)]
pub enum VectorIndexError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for VectorIndexError {
    fn from(err: reqwest::Error) -> Self {
        VectorIndexError::Network(err.to_string())
    }
}
