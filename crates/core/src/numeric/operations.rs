use serde_json::{Number, Value};

use super::{NumericError, NumericOp, Result};

/// Largest integer an `f64` represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A numeric operand, kept as an integer for as long as the arithmetic allows.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Operand {
    Int(i64),
    Float(f64),
}

impl Operand {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Operand::Int(i)),
                None => n.as_f64().map(Operand::Float),
            },
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Operand::Int(i) => i as f64,
            Operand::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Operand::Int(i) => i == 0,
            Operand::Float(f) => f == 0.0,
        }
    }
}

/// Names the JSON type of a value for error messages.
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_mismatch(op: NumericOp, key: &str, found: impl Into<String>) -> NumericError {
    NumericError::TypeMismatch {
        op,
        key: key.to_string(),
        found: found.into(),
    }
}

fn parse_operand(op: NumericOp, key: &str, delta: &Value) -> Result<Operand> {
    let operand = Operand::from_value(delta)
        .ok_or_else(|| type_mismatch(op, key, format!("{} operand", kind_of(delta))))?;

    if op == NumericOp::Div && operand.is_zero() {
        return Err(NumericError::DivideByZero);
    }

    Ok(operand)
}

/// Validates an operand before the current value is read.
///
/// Fails with [`NumericError::DivideByZero`] for `div` by zero, whatever the key
/// currently holds.
pub fn check_operand(op: NumericOp, key: &str, delta: &Value) -> Result<()> {
    parse_operand(op, key, delta).map(|_| ())
}

/// Applies `op` to the current value of `key` and returns the value to store.
///
/// `current` is `None` when the key is absent. A stored JSON `null` is present
/// and non-numeric.
pub fn apply(op: NumericOp, key: &str, current: Option<&Value>, delta: &Value) -> Result<Value> {
    let rhs = parse_operand(op, key, delta)?;

    let lhs = match current {
        Some(value) => {
            Operand::from_value(value).ok_or_else(|| type_mismatch(op, key, kind_of(value)))?
        }
        None => match op.missing_default() {
            Some(default) => Operand::Int(default),
            None => return Err(type_mismatch(op, key, "absent value")),
        },
    };

    let exact = match (op, lhs, rhs) {
        (NumericOp::Add, Operand::Int(a), Operand::Int(b)) => a.checked_add(b),
        (NumericOp::Sub, Operand::Int(a), Operand::Int(b)) => a.checked_sub(b),
        (NumericOp::Mul, Operand::Int(a), Operand::Int(b)) => a.checked_mul(b),
        (NumericOp::Div, Operand::Int(a), Operand::Int(b)) if a.checked_rem(b) == Some(0) => {
            a.checked_div(b)
        }
        _ => None,
    };

    let result = match exact {
        Some(i) => Operand::Int(i),
        None => {
            let (a, b) = (lhs.as_f64(), rhs.as_f64());
            Operand::Float(match op {
                NumericOp::Add => a + b,
                NumericOp::Sub => a - b,
                NumericOp::Mul => a * b,
                NumericOp::Div => a / b,
            })
        }
    };

    to_value(op, key, result)
}

/// Converts a result back to a JSON value.
///
/// Integral floats within the exact range are stored as integers, so `10 / 4 * 2`
/// is stored as `5` rather than `5.0`.
fn to_value(op: NumericOp, key: &str, result: Operand) -> Result<Value> {
    match result {
        Operand::Int(i) => Ok(Value::from(i)),
        Operand::Float(f) if !f.is_finite() => Err(NumericError::NonFiniteResult {
            op,
            key: key.to_string(),
        }),
        Operand::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            Ok(Value::from(f as i64))
        }
        Operand::Float(f) => Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| NumericError::NonFiniteResult {
                op,
                key: key.to_string(),
            }),
    }
}

/// Adds `delta` to the current value; an absent key counts as 0.
pub fn apply_add(key: &str, current: Option<&Value>, delta: &Value) -> Result<Value> {
    apply(NumericOp::Add, key, current, delta)
}

/// Subtracts `delta` from the current value, which must exist.
pub fn apply_sub(key: &str, current: Option<&Value>, delta: &Value) -> Result<Value> {
    apply(NumericOp::Sub, key, current, delta)
}

/// Multiplies the current value, which must exist, by `delta`.
pub fn apply_mul(key: &str, current: Option<&Value>, delta: &Value) -> Result<Value> {
    apply(NumericOp::Mul, key, current, delta)
}

/// Divides the current value by a non-zero `delta`; an absent key counts as 1.
pub fn apply_div(key: &str, current: Option<&Value>, delta: &Value) -> Result<Value> {
    apply(NumericOp::Div, key, current, delta)
}
