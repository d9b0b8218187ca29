use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrendzError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, TrendzError>;
