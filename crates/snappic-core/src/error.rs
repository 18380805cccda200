use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnappicError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("parse error: {0}")]
    Parse(String),
}
