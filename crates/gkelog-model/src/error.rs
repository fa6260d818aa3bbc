use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown log severity: {0}")]
    UnknownSeverity(String),
}
