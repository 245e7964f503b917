use thiserror::Error;

pub type Result<T> = std::result::Result<T, SqsClientError>;

#[derive(Debug, Error)]
pub enum SqsClientError {
    #[error("SQS request failed: {0}")]
    Aws(String),

    #[error("message body was not valid JSON: {0}")]
    MalformedBody(String),
}
