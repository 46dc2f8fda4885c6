//! Booleans treat the bitwise operators as their logical counterparts.

use crate::runtime::value::Value;
use crate::types::TypeOps;
use crate::types::compare::Compare;

fn convert(from: &Value) -> Option<Value> {
    Some(Value::Bool(from.truth()))
}

fn compare(lhs: &Value, rhs: &Value) -> Compare {
    match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) => Compare::of(a, b),
        _ => Compare::Incomparable,
    }
}

fn bit_and(lhs: &Value, rhs: &Value) -> Option<Value> { Some(Value::logic_and(lhs, rhs)) }
fn bit_or(lhs: &Value, rhs: &Value) -> Option<Value> { Some(Value::logic_or(lhs, rhs)) }
fn bit_xor(lhs: &Value, rhs: &Value) -> Option<Value> { Some(Value::logic_xor(lhs, rhs)) }
fn bit_not(value: &Value) -> Option<Value> { Some(Value::logic_not(value)) }

pub(crate) const OPS: TypeOps = TypeOps {
    convert,
    compare,
    bit_and: Some(bit_and),
    bit_or:  Some(bit_or),
    bit_xor: Some(bit_xor),
    bit_not: Some(bit_not),
    ..TypeOps::BASE
};
