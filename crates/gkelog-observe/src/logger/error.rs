use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Invalid log format: {0} (expected: gke|text)")]
    InvalidFormat(String),

    #[error("Logger already initialized")]
    AlreadyInitialized,

    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
}

pub type LoggerResult<T> = Result<T, LoggerError>;
