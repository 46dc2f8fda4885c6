//! Standard math library.
//!
//! Numeric functions convert every argument to a float first. An argument that
//! cannot be converted (a length or a color) makes the result `NaN` rather than
//! an error.

use std::f64::consts::{E, PI};

use tracing::trace;

use super::{FunctionRegistry, not_applicable};
use crate::error::EvalError;
use crate::runtime::value::Value;
use crate::types::Type;
use crate::types::compare::Compare;

type Unary = fn(f64) -> f64;
type Binary = fn(f64, f64) -> f64;

const UNARY: &[(&str, Unary)] = &[
    ("sqrt",  f64::sqrt),
    ("cbrt",  f64::cbrt),
    ("abs",   f64::abs),
    ("sign",  sign),
    ("round", f64::round_ties_even),
    ("floor", f64::floor),
    ("ceil",  f64::ceil),
    ("ln",    f64::ln),
    ("log2",  f64::log2),
    ("log10", f64::log10),
    ("exp",   f64::exp),
    ("sin",   f64::sin),
    ("cos",   f64::cos),
    ("tan",   f64::tan),
    ("sinh",  f64::sinh),
    ("cosh",  f64::cosh),
    ("tanh",  f64::tanh),
    ("asin",  f64::asin),
    ("acos",  f64::acos),
    ("atan",  f64::atan),
    ("asinh", f64::asinh),
    ("acosh", f64::acosh),
    ("atanh", f64::atanh),
];

const BINARY: &[(&str, Binary)] = &[
    ("atan2", f64::atan2),
    ("log",   log),
    ("pow",   f64::powf),
    ("hypot", f64::hypot),
];

/// Zero stays zero and `NaN` stays `NaN`, unlike `f64::signum`.
fn sign(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() { x } else { x.signum() }
}

fn log(x: f64, base: f64) -> f64 {
    x.ln() / base.ln()
}

fn num(v: &Value) -> f64 {
    v.convert(Type::Float).and_then(|f| f.as_float()).unwrap_or(f64::NAN)
}

pub fn register(r: &mut FunctionRegistry) {
    r.register_fixed("e", 0, |_: &[Value]| Ok(Value::Float(E)));
    r.register_fixed("pi", 0, |_: &[Value]| Ok(Value::Float(PI)));

    for &(name, f) in UNARY {
        r.register_fixed(name, 1, move |args: &[Value]| Ok(Value::Float(f(num(&args[0])))));
    }
    for &(name, f) in BINARY {
        r.register_fixed(name, 2, move |args: &[Value]| Ok(Value::Float(f(num(&args[0]), num(&args[1])))));
    }

    r.register("min", |args: &[Value]| extreme("min", Compare::Less, args));
    r.register("max", |args: &[Value]| extreme("max", Compare::Greater, args));
}

/// Variadic `min`/`max` over any mutually comparable values. No arguments
/// yields null.
fn extreme(name: &str, wins: Compare, args: &[Value]) -> Result<Value, EvalError> {
    let Some((first, rest)) = args.split_first() else {
        return Ok(Value::Null);
    };
    let mut best = first;
    for v in rest {
        match Value::compare(v, best) {
            Compare::Incomparable => {
                trace!(name, "incomparable arguments");
                return Err(not_applicable(name, args));
            }
            c if c == wins => best = v,
            _ => {}
        }
    }
    Ok(best.clone())
}
