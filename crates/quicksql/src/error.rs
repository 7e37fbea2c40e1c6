//! Error types for the quicksql crate.

use quicksql_core::{CodecError, NumericError, StoreError};
use thiserror::Error;

/// Result type alias for quicksql operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`DualStore`](crate::DualStore) operations.
///
/// Storage errors come straight from the backend; numeric errors are raised
/// before anything is written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Numeric(#[from] NumericError),
}
