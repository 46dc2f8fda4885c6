//! Angles in radians. They scale by plain numbers but never multiply with
//! each other; dividing two angles yields a plain ratio.

use super::float::to_double;
use super::scalar;
use crate::runtime::value::Value;
use crate::types::TypeOps;
use crate::types::compare::Compare;

fn convert(from: &Value) -> Option<Value> {
    to_double(from).map(Value::Angle)
}

fn compare(lhs: &Value, rhs: &Value) -> Compare {
    match (lhs, rhs) {
        (Value::Angle(a), Value::Angle(b)) => Compare::of_f64(*a, *b),
        _ => Compare::Incomparable,
    }
}

fn arith(v: &Value) -> Option<f64> {
    match v {
        Value::Angle(a) => Some(*a),
        other => scalar(other),
    }
}

fn add(l: &Value, r: &Value) -> Option<Value> { Some(Value::Angle(arith(l)? + arith(r)?)) }
fn sub(l: &Value, r: &Value) -> Option<Value> { Some(Value::Angle(arith(l)? - arith(r)?)) }

fn mul(l: &Value, r: &Value) -> Option<Value> {
    match (l, r) {
        (Value::Angle(_), Value::Angle(_)) => None,
        (Value::Angle(a), s) | (s, Value::Angle(a)) => Some(Value::Angle(a * scalar(s)?)),
        _ => None,
    }
}

fn div(l: &Value, r: &Value) -> Option<Value> {
    match (l, r) {
        (Value::Angle(a), Value::Angle(b)) => Some(Value::Float(a / b)),
        (Value::Angle(a), s) => Some(Value::Angle(a / scalar(s)?)),
        _ => None,
    }
}

fn plus(v: &Value) -> Option<Value> { Some(v.clone()) }
fn neg(v: &Value) -> Option<Value> { v.as_angle().map(|a| Value::Angle(-a)) }
fn abs(v: &Value) -> Option<Value> { v.as_angle().map(|a| Value::Angle(a.abs())) }

pub(crate) const OPS: TypeOps = TypeOps {
    convert,
    compare,
    plus: Some(plus),
    neg: Some(neg),
    abs: Some(abs),
    add: Some(add),
    sub: Some(sub),
    mul: Some(mul),
    div: Some(div),
    ..TypeOps::BASE
};
