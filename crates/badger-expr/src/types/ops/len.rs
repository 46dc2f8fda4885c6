use super::{parse_double, scalar};
use crate::runtime::value::Value;
use crate::types::TypeOps;
use crate::types::length::Length;

fn convert(from: &Value) -> Option<Value> {
    let l = match from {
        Value::Null     => Length::ZERO,
        Value::Int(i)   => Length::pixels(*i as f64),
        Value::Float(f) => Length::pixels(*f),
        Value::Str(s)   => Length::pixels(parse_double(s)),
        _ => return None,
    };
    Some(Value::Length(l))
}

/// Plain numbers join a length sum as pixels.
fn arith(v: &Value) -> Option<Length> {
    match v {
        Value::Bool(b)   => Some(if *b { Length::ONE_PIXEL } else { Length::ZERO }),
        Value::Int(i)    => Some(Length::pixels(*i as f64)),
        Value::Float(f)  => Some(Length::pixels(*f)),
        Value::Length(l) => Some(*l),
        _ => None,
    }
}

fn add(l: &Value, r: &Value) -> Option<Value> { Some(Value::Length(arith(l)? + arith(r)?)) }
fn sub(l: &Value, r: &Value) -> Option<Value> { Some(Value::Length(arith(l)? - arith(r)?)) }

// No areas and no per-length units: length by length never works.
fn mul(l: &Value, r: &Value) -> Option<Value> {
    match (l, r) {
        (Value::Length(_), Value::Length(_)) => None,
        (Value::Length(len), s) | (s, Value::Length(len)) => Some(Value::Length(*len * scalar(s)?)),
        _ => None,
    }
}

fn div(l: &Value, r: &Value) -> Option<Value> {
    match (l, r) {
        (Value::Length(_), Value::Length(_)) => None,
        (Value::Length(len), s) => Some(Value::Length(*len / scalar(s)?)),
        _ => None,
    }
}

fn plus(v: &Value) -> Option<Value> { Some(v.clone()) }
fn neg(v: &Value) -> Option<Value> { v.as_length().map(|l| Value::Length(-l)) }

pub(crate) const OPS: TypeOps = TypeOps {
    convert,
    plus: Some(plus),
    neg: Some(neg),
    add: Some(add),
    sub: Some(sub),
    mul: Some(mul),
    div: Some(div),
    ..TypeOps::BASE
};

#[cfg(test)]
mod tests {
    use crate::runtime::value::Value;
    use crate::types::compare::Compare;
    use crate::types::length::Length;
    use crate::types::{BinaryOp, Type, UnaryOp};

    fn px(v: f64) -> Value { Value::Length(Length::pixels(v)) }

    #[test]
    fn numbers_add_as_pixels() {
        let l = Value::Length(Length::inches(1.0));
        assert_eq!(Value::apply(BinaryOp::Add, &l, &Value::Int(3)), Some(Value::Length(Length::new(3.0, 1.0, 0.0, 0.0))));
        assert_eq!(Value::apply(BinaryOp::Sub, &Value::Bool(true), &px(1.0)), Some(px(0.0)));
    }

    #[test]
    fn scaling() {
        assert_eq!(Value::apply(BinaryOp::Mul, &Value::Int(2), &px(3.0)), Some(px(6.0)));
        assert_eq!(Value::apply(BinaryOp::Div, &px(3.0), &Value::Float(2.0)), Some(px(1.5)));
        assert_eq!(Value::apply(BinaryOp::Mul, &px(1.0), &px(1.0)), None);
        assert_eq!(Value::apply(BinaryOp::Div, &px(1.0), &px(1.0)), None);
        assert_eq!(Value::apply(BinaryOp::Div, &Value::Int(1), &px(1.0)), None);
    }

    #[test]
    fn no_abs() {
        assert_eq!(Value::unary(UnaryOp::Abs, &px(-1.0)), None);
        assert_eq!(Value::unary(UnaryOp::Neg, &px(-1.0)), Some(px(1.0)));
    }

    #[test]
    fn structural_compare_only() {
        assert_eq!(Value::compare(&px(1.0), &px(1.0)), Compare::Equal);
        assert_eq!(Value::compare(&px(1.0), &px(2.0)), Compare::Incomparable);
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::from("12").convert(Type::Length), Some(px(12.0)));
        assert_eq!(Value::Bool(true).convert(Type::Length), None);
        assert_eq!(Value::Null.convert(Type::Length), Some(Value::Length(Length::ZERO)));
    }
}
