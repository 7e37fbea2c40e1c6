use thiserror::Error;

use super::NumericOp;

/// Errors that can occur when applying an arithmetic operation to a stored value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumericError {
    /// The stored value or the operand is not a number.
    #[error("{op} requires numeric values, but found {found} for key \"{key}\"")]
    TypeMismatch {
        op: NumericOp,
        key: String,
        found: String,
    },
    #[error("Cannot divide by zero")]
    DivideByZero,
    /// The result overflowed to infinity and cannot be stored as JSON.
    #[error("{op} on key \"{key}\" produced a non-finite result")]
    NonFiniteResult { op: NumericOp, key: String },
}
