use super::parse_double;
use crate::runtime::value::Value;
use crate::types::TypeOps;
use crate::types::compare::Compare;

/// Shared by floats and angles: both convert from the same set of types.
pub(crate) fn to_double(from: &Value) -> Option<f64> {
    match from {
        Value::Null     => Some(0.0),
        Value::Int(i)   => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Angle(a) => Some(*a),
        Value::Bool(b)  => Some(if *b { 1.0 } else { 0.0 }),
        Value::Str(s)   => Some(parse_double(s)),
        _ => None,
    }
}

fn convert(from: &Value) -> Option<Value> {
    to_double(from).map(Value::Float)
}

// Floats outrank ints, so every int/float comparison lands here.
fn comparable(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i)   => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn compare(lhs: &Value, rhs: &Value) -> Compare {
    match (comparable(lhs), comparable(rhs)) {
        (Some(a), Some(b)) => Compare::of_f64(a, b),
        _ => Compare::Incomparable,
    }
}

fn arith(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i)   => Some(*i as f64),
        Value::Bool(b)  => Some(if *b { 1.0 } else { 0.0 }),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn binary(lhs: &Value, rhs: &Value, f: impl FnOnce(f64, f64) -> f64) -> Option<Value> {
    Some(Value::Float(f(arith(lhs)?, arith(rhs)?)))
}

fn add(l: &Value, r: &Value) -> Option<Value> { binary(l, r, |a, b| a + b) }
fn sub(l: &Value, r: &Value) -> Option<Value> { binary(l, r, |a, b| a - b) }
fn mul(l: &Value, r: &Value) -> Option<Value> { binary(l, r, |a, b| a * b) }
fn div(l: &Value, r: &Value) -> Option<Value> { binary(l, r, |a, b| a / b) }
fn rem(l: &Value, r: &Value) -> Option<Value> { binary(l, r, |a, b| a % b) }

fn plus(v: &Value) -> Option<Value> { Some(v.clone()) }
fn neg(v: &Value) -> Option<Value> { v.as_float().map(|f| Value::Float(-f)) }
fn abs(v: &Value) -> Option<Value> { v.as_float().map(|f| Value::Float(f.abs())) }

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
    rem: Some(rem),
    ..TypeOps::BASE
};
