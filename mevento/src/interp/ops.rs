//! Operator semantics on runtime values

use super::{InterpResult, RuntimeError, Value};
use crate::ast::{BinOp, UnOp};

/// Largest string, in bytes, that `*` may build
pub const MAX_REPEAT_BYTES: usize = 1 << 30;

/// Apply a binary operator to two evaluated operands.
pub fn binary(op: BinOp, left: &Value, right: &Value) -> InterpResult<Value> {
    match op {
        BinOp::Add => match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
            (a, b) if a.is_number() && b.is_number() => Ok(Value::Float(float(a) + float(b))),
            _ => Ok(Value::from(format!("{left}{right}"))),
        },
        BinOp::Sub => match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(*b))),
            (a, b) if a.is_number() && b.is_number() => Ok(Value::Float(float(a) - float(b))),
            _ => Err(invalid(op, left, right)),
        },
        BinOp::Mul => match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(*b))),
            (a, b) if a.is_number() && b.is_number() => Ok(Value::Float(float(a) * float(b))),
            (Value::Str(s), n) | (n, Value::Str(s)) if n.is_number() => repeat(s, n),
            _ => Err(invalid(op, left, right)),
        },
        BinOp::Div => match (left, right) {
            (_, b) if is_zero(b) && left.is_number() => Err(RuntimeError::division_by_zero()),
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_div(*b))),
            (a, b) if a.is_number() && b.is_number() => Ok(Value::Float(float(a) / float(b))),
            _ => Err(invalid(op, left, right)),
        },
        BinOp::Mod => match (left, right) {
            (_, b) if is_zero(b) && left.is_number() => Err(RuntimeError::division_by_zero()),
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_rem(*b))),
            (a, b) if a.is_number() && b.is_number() => Ok(Value::Float(float(a) % float(b))),
            _ => Err(invalid(op, left, right)),
        },
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
            if !(left.is_number() && right.is_number()) {
                return Err(invalid(op, left, right));
            }
            let (a, b) = (float(left), float(right));
            Ok(Value::Bool(match op {
                BinOp::Lt => a < b,
                BinOp::Gt => a > b,
                BinOp::Le => a <= b,
                _ => a >= b,
            }))
        }
        BinOp::Eq => Ok(Value::Bool(left == right)),
        BinOp::Ne => Ok(Value::Bool(left != right)),
    }
}

/// Apply a unary operator to an evaluated operand.
pub fn unary(op: UnOp, value: &Value) -> InterpResult<Value> {
    match (op, value) {
        (UnOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnOp::Plus, v) if v.is_number() => Ok(v.clone()),
        (UnOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (UnOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (op, v) => Err(RuntimeError::type_error(
            "number",
            &format!("{} for unary `{op}`", v.type_name()),
        )),
    }
}

/// Read `owner[key]`. Missing list slots and map keys read as null.
pub fn index_get(owner: &Value, key: &Value) -> InterpResult<Value> {
    match owner {
        Value::List(items) => {
            let items = items.read();
            Ok(list_index(key, items.len())
                .and_then(|i| items.get(i).cloned())
                .unwrap_or_default())
        }
        Value::Map(map) => {
            let key = key.to_string();
            Ok(map.read().get(&key).cloned().unwrap_or_default())
        }
        other => Err(RuntimeError::not_indexable(other.type_name())),
    }
}

/// Write `owner[key] = value`.
pub fn index_set(owner: &Value, key: &Value, value: Value) -> InterpResult<()> {
    match owner {
        Value::List(items) => {
            if !key.is_number() {
                return Err(RuntimeError::type_error("number", key.type_name()));
            }
            let mut items = items.write();
            let len = items.len();
            match list_index(key, len) {
                Some(i) => {
                    items[i] = value;
                    Ok(())
                }
                _ => Err(RuntimeError::index_out_of_bounds(float(key) as i64, len)),
            }
        }
        Value::Map(map) => {
            // the key may print the map itself
            let key = key.to_string();
            map.write().insert(key, value);
            Ok(())
        }
        other => Err(RuntimeError::not_indexable(other.type_name())),
    }
}

/// Numeric key truncated toward zero; `None` when negative, out of range
/// or not a number.
fn list_index(key: &Value, len: usize) -> Option<usize> {
    let index = match key {
        Value::Int(n) => *n,
        Value::Float(x) if x.is_finite() => x.trunc() as i64,
        _ => return None,
    };
    usize::try_from(index).ok().filter(|i| *i < len)
}

fn repeat(s: &str, count: &Value) -> InterpResult<Value> {
    let count = float(count).trunc();
    if count <= 0.0 || count.is_nan() || s.is_empty() {
        return Ok(Value::from(""));
    }
    if count >= usize::MAX as f64 {
        return Err(RuntimeError::size_limit(MAX_REPEAT_BYTES));
    }
    match s.len().checked_mul(count as usize) {
        Some(bytes) if bytes <= MAX_REPEAT_BYTES => Ok(Value::from(s.repeat(count as usize))),
        _ => Err(RuntimeError::size_limit(MAX_REPEAT_BYTES)),
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Int(n) => *n == 0,
        Value::Float(x) => *x == 0.0,
        _ => false,
    }
}

fn float(value: &Value) -> f64 {
    value.as_float().unwrap_or(f64::NAN)
}

fn invalid(op: BinOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::invalid_operands(&op.to_string(), left.type_name(), right.type_name())
}
