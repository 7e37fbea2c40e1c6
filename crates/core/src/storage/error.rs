use thiserror::Error;

/// Errors that can occur during record store operations.
///
/// Backend errors are classified by kind only. The backend message is kept
/// verbatim and nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
