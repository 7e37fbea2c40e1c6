//! Arithmetic rules for the numeric read-modify-write operations.
//!
//! Pure functions only: the caller reads the current value, hands it here together
//! with the operand, and writes back whatever comes out. Nothing here touches a store.

mod error;
mod operations;

use std::fmt;

pub use error::NumericError;
pub use operations::{apply, apply_add, apply_div, apply_mul, apply_sub, check_operand};

/// Result type for numeric operations.
pub type Result<T> = std::result::Result<T, NumericError>;

/// The four arithmetic operations supported on stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl NumericOp {
    /// Returns the lowercase operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericOp::Add => "add",
            NumericOp::Sub => "sub",
            NumericOp::Mul => "mul",
            NumericOp::Div => "div",
        }
    }

    /// The value assumed for an absent key, if this operation assumes one.
    ///
    /// `add` starts counters at 0 and `div` starts ratios at 1. `sub` and `mul`
    /// have no default, so running them on an absent key is an error.
    pub fn missing_default(&self) -> Option<i64> {
        match self {
            NumericOp::Add => Some(0),
            NumericOp::Div => Some(1),
            NumericOp::Sub | NumericOp::Mul => None,
        }
    }
}

impl fmt::Display for NumericOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
