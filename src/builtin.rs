use std::cmp::Ordering;

use crate::interpreter::{RuntimeError, Value};
use crate::parser::{ArithOp, Comparison};

enum Operands {
    Ints(i64, i64),
    Floats(f64, f64),
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(n) => Some(*n),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Text(_) => None,
    }
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Int(n) => Some(*n),
        Value::Bool(b) => Some(*b as i64),
        _ => None,
    }
}

/// Ints stay ints; anything involving a float is promoted.
fn promote(left: &Value, right: &Value) -> Option<Operands> {
    match (as_int(left), as_int(right)) {
        (Some(a), Some(b)) => Some(Operands::Ints(a, b)),
        _ => Some(Operands::Floats(as_float(left)?, as_float(right)?)),
    }
}

fn mismatch(op: impl ToString, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch {
        op: op.to_string(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn divide(a: f64, b: f64) -> Result<Value, RuntimeError> {
    if b == 0.0 {
        Err(RuntimeError::DivisionByZero)
    } else {
        Ok(Value::Float(a / b))
    }
}

macro_rules! arithmetic {
    {
        $( $op:ident => ints |$ia:ident, $ib:ident| $int:expr, floats |$fa:ident, $fb:ident| $float:expr;)*
    } => {
        fn numeric(op: ArithOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
            match (op, promote(left, right)) {
                $(
                    (ArithOp::$op, Some(Operands::Ints($ia, $ib))) => $int,
                    (ArithOp::$op, Some(Operands::Floats($fa, $fb))) => $float,
                )*
                (op, None) => Err(mismatch(op, left, right)),
            }
        }
    };
}

arithmetic! {
    Add => ints |a, b| a.checked_add(b).map(Value::Int).ok_or(RuntimeError::Overflow(ArithOp::Add)),
        floats |a, b| Ok(Value::Float(a + b));
    Sub => ints |a, b| a.checked_sub(b).map(Value::Int).ok_or(RuntimeError::Overflow(ArithOp::Sub)),
        floats |a, b| Ok(Value::Float(a - b));
    Mul => ints |a, b| a.checked_mul(b).map(Value::Int).ok_or(RuntimeError::Overflow(ArithOp::Mul)),
        floats |a, b| Ok(Value::Float(a * b));
    Div => ints |a, b| divide(a as f64, b as f64),
        floats |a, b| divide(a, b);
}

pub fn arithmetic(op: ArithOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (op, left, right) {
        (ArithOp::Add, Value::Text(mut a), Value::Text(b)) => {
            a.push_str(&b);
            Ok(Value::Text(a))
        }
        (op, left, right) => numeric(op, &left, &right),
    }
}

pub fn negate(value: Value) -> Result<Value, RuntimeError> {
    match value {
        Value::Float(n) => Ok(Value::Float(-n)),
        other => match as_int(&other) {
            Some(n) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or(RuntimeError::Overflow(ArithOp::Sub)),
            None => Err(RuntimeError::BadOperand {
                op: "-",
                operand: other.type_name(),
            }),
        },
    }
}

pub fn concatenate(left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Text(mut a), Value::Text(b)) => {
            a.push_str(&b);
            Ok(Value::Text(a))
        }
        (left, right) => Err(mismatch("+", &left, &right)),
    }
}

fn ordering(left: &Value, right: &Value) -> Option<Option<Ordering>> {
    match (left, right) {
        (Value::Text(a), Value::Text(b)) => Some(Some(a.cmp(b))),
        (Value::Text(_), _) | (_, Value::Text(_)) => None,
        _ => Some(match promote(left, right)? {
            Operands::Ints(a, b) => Some(a.cmp(&b)),
            Operands::Floats(a, b) => a.partial_cmp(&b),
        }),
    }
}

/// Applies a comparison operator. Values of unrelated kinds are never equal
/// and cannot be ordered.
pub fn compare(op: Comparison, left: &Value, right: &Value) -> Result<bool, RuntimeError> {
    let ord = match (op, ordering(left, right)) {
        (_, Some(ord)) => ord,
        (Comparison::Eq, None) => return Ok(false),
        (Comparison::Ne, None) => return Ok(true),
        (op, None) => return Err(mismatch(op, left, right)),
    };
    Ok(match op {
        Comparison::Lt => ord == Some(Ordering::Less),
        Comparison::Le => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
        Comparison::Eq => ord == Some(Ordering::Equal),
        Comparison::Ne => ord != Some(Ordering::Equal),
        Comparison::Ge => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        Comparison::Gt => ord == Some(Ordering::Greater),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn division_is_always_real() {
        assert_eq!(
            arithmetic(ArithOp::Div, Value::Int(4), Value::Int(2)),
            Ok(Value::Float(2.0))
        );
        assert_eq!(
            arithmetic(ArithOp::Div, Value::Int(1), Value::Int(0)),
            Err(RuntimeError::DivisionByZero)
        );
    }

    #[test]
    fn ints_promote_to_floats() {
        assert_eq!(
            arithmetic(ArithOp::Add, Value::Int(1), Value::Int(2)),
            Ok(Value::Int(3))
        );
        assert_eq!(
            arithmetic(ArithOp::Mul, Value::Int(3), Value::Float(0.5)),
            Ok(Value::Float(1.5))
        );
    }

    #[test]
    fn integer_overflow_is_reported() {
        assert_eq!(
            arithmetic(ArithOp::Add, Value::Int(i64::MAX), Value::Int(1)),
            Err(RuntimeError::Overflow(ArithOp::Add))
        );
        assert_eq!(
            negate(Value::Int(i64::MIN)),
            Err(RuntimeError::Overflow(ArithOp::Sub))
        );
    }

    #[test]
    fn text_only_supports_addition() {
        assert_eq!(
            arithmetic(ArithOp::Add, text("a"), text("b")),
            Ok(text("ab"))
        );
        assert_eq!(
            arithmetic(ArithOp::Sub, text("a"), Value::Int(1)),
            Err(RuntimeError::TypeMismatch {
                op: "-".to_string(),
                left: "text",
                right: "integer",
            })
        );
        assert!(negate(text("a")).is_err());
    }

    #[test]
    fn concatenation_requires_text_on_both_sides() {
        assert_eq!(concatenate(text("x"), text("y")), Ok(text("xy")));
        assert!(concatenate(text("x"), Value::Int(1)).is_err());
    }

    #[test]
    fn comparisons_follow_native_ordering() {
        assert_eq!(compare(Comparison::Lt, &Value::Int(1), &Value::Float(1.5)), Ok(true));
        assert_eq!(compare(Comparison::Ge, &text("b"), &text("a")), Ok(true));
        assert_eq!(compare(Comparison::Eq, &Value::Int(2), &Value::Float(2.0)), Ok(true));
        assert_eq!(compare(Comparison::Ne, &Value::Int(2), &Value::Int(2)), Ok(false));
        assert_eq!(
            compare(Comparison::Le, &Value::Float(f64::NAN), &Value::Float(1.0)),
            Ok(false)
        );
    }

    #[test]
    fn unrelated_kinds_are_unequal_but_unordered() {
        assert_eq!(compare(Comparison::Eq, &text("1"), &Value::Int(1)), Ok(false));
        assert_eq!(compare(Comparison::Ne, &text("1"), &Value::Int(1)), Ok(true));
        assert!(compare(Comparison::Lt, &text("1"), &Value::Int(1)).is_err());
    }
}
