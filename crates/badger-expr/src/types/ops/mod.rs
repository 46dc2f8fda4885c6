//! Per-type operator tables.
//!
//! Each module exports one `OPS` table. A binary operator receives both
//! operands unchanged, so an implementation must check which side carries its
//! own type before reading payloads.

pub(crate) mod angle;
pub(crate) mod bool;
pub(crate) mod col;
pub(crate) mod float;
pub(crate) mod int;
pub(crate) mod len;
pub(crate) mod null;
pub(crate) mod str;

use crate::runtime::value::Value;

/// A plain number usable as a multiplier or divisor of a unit value.
pub(crate) fn scalar(v: &Value) -> Option<f64> {
    match v {
        Value::Bool(b)  => Some(if *b { 1.0 } else { 0.0 }),
        Value::Int(i)   => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Lenient string-to-double parse; malformed input becomes `NaN`.
pub(crate) fn parse_double(s: &str) -> f64 {
    s.trim().parse().unwrap_or(f64::NAN)
}
