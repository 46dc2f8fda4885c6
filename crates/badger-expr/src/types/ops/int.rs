//! 64-bit integers. Arithmetic wraps on overflow; booleans count as 0 and 1.

use crate::runtime::value::Value;
use crate::types::TypeOps;
use crate::types::compare::Compare;

/// Shift amounts beyond this magnitude always produce zero. Narrowing a huge
/// amount to 32 bits could otherwise land back in range.
const SHIFT_LIMIT: i64 = 65;

fn convert(from: &Value) -> Option<Value> {
    let v = match from {
        Value::Null     => 0,
        Value::Float(f) => *f as i64,
        Value::Angle(a) => *a as i64,
        Value::Bool(b)  => i64::from(*b),
        Value::Str(s)   => s.parse().unwrap_or(0),
        _ => return None,
    };
    Some(Value::Int(v))
}

fn compare(lhs: &Value, rhs: &Value) -> Compare {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Compare::of(a, b),
        _ => Compare::Incomparable,
    }
}

fn arith(v: &Value) -> Option<i64> {
    match v {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Int(i)  => Some(*i),
        _ => None,
    }
}

/// True when `lhs / rhs` would be an integer division with a zero divisor.
pub(crate) fn divides_by_zero(lhs: &Value, rhs: &Value) -> bool {
    let has_int = matches!(lhs, Value::Int(_)) || matches!(rhs, Value::Int(_));
    has_int && arith(lhs).is_some() && arith(rhs) == Some(0)
}

fn binary(lhs: &Value, rhs: &Value, f: impl FnOnce(i64, i64) -> i64) -> Option<Value> {
    Some(Value::Int(f(arith(lhs)?, arith(rhs)?)))
}

fn checked(lhs: &Value, rhs: &Value, f: impl FnOnce(i64, i64) -> Option<i64>) -> Option<Value> {
    f(arith(lhs)?, arith(rhs)?).map(Value::Int)
}

fn add(l: &Value, r: &Value) -> Option<Value> { binary(l, r, i64::wrapping_add) }
fn sub(l: &Value, r: &Value) -> Option<Value> { binary(l, r, i64::wrapping_sub) }
fn mul(l: &Value, r: &Value) -> Option<Value> { binary(l, r, i64::wrapping_mul) }
fn bit_and(l: &Value, r: &Value) -> Option<Value> { binary(l, r, |a, b| a & b) }
fn bit_or(l: &Value, r: &Value) -> Option<Value> { binary(l, r, |a, b| a | b) }
fn bit_xor(l: &Value, r: &Value) -> Option<Value> { binary(l, r, |a, b| a ^ b) }

// Zero divisors are rejected before dispatch, see `divides_by_zero`.
fn div(l: &Value, r: &Value) -> Option<Value> {
    checked(l, r, |a, b| (b != 0).then(|| a.wrapping_div(b)))
}

fn rem(l: &Value, r: &Value) -> Option<Value> {
    checked(l, r, |a, b| (b != 0).then(|| a.wrapping_rem(b)))
}

fn shl(l: &Value, r: &Value) -> Option<Value> {
    binary(l, r, |a, n| {
        if !(-SHIFT_LIMIT..=SHIFT_LIMIT).contains(&n) { 0 } else { a.wrapping_shl(n as u32) }
    })
}

/// Logical (unsigned) right shift.
fn shr(l: &Value, r: &Value) -> Option<Value> {
    binary(l, r, |a, n| {
        if !(-SHIFT_LIMIT..=SHIFT_LIMIT).contains(&n) { 0 } else { (a as u64).wrapping_shr(n as u32) as i64 }
    })
}

fn plus(v: &Value) -> Option<Value> { Some(v.clone()) }
fn neg(v: &Value) -> Option<Value> { v.as_int().map(|i| Value::Int(i.wrapping_neg())) }
fn abs(v: &Value) -> Option<Value> { v.as_int().map(|i| Value::Int(i.wrapping_abs())) }
fn bit_not(v: &Value) -> Option<Value> { v.as_int().map(|i| Value::Int(!i)) }

pub(crate) const OPS: TypeOps = TypeOps {
    convert,
    compare,
    plus: Some(plus),
    neg: Some(neg),
    abs: Some(abs),
    bit_not: Some(bit_not),
    add: Some(add),
    sub: Some(sub),
    mul: Some(mul),
    div: Some(div),
    rem: Some(rem),
    shl: Some(shl),
    shr: Some(shr),
    bit_and: Some(bit_and),
    bit_or: Some(bit_or),
    bit_xor: Some(bit_xor),
};

#[cfg(test)]
mod tests {
    use crate::runtime::value::Value;
    use crate::types::{BinaryOp, Type, UnaryOp};

    fn int(op: BinaryOp, a: i64, b: i64) -> Option<Value> {
        Value::apply(op, &Value::Int(a), &Value::Int(b))
    }

    #[test]
    fn shift_guard() {
        assert_eq!(int(BinaryOp::Shl, 1, 100), Some(Value::Int(0)));
        assert_eq!(int(BinaryOp::Shl, 1, -100), Some(Value::Int(0)));
        assert_eq!(int(BinaryOp::Shr, -1, 100), Some(Value::Int(0)));
        assert_eq!(int(BinaryOp::Shl, 1, 4), Some(Value::Int(16)));
        // 64 masks to 0 like a hardware shift.
        assert_eq!(int(BinaryOp::Shl, 1, 64), Some(Value::Int(1)));
    }

    #[test]
    fn right_shift_is_logical() {
        assert_eq!(int(BinaryOp::Shr, -1, 60), Some(Value::Int(15)));
    }

    #[test]
    fn wrapping_arithmetic() {
        assert_eq!(int(BinaryOp::Add, i64::MAX, 1), Some(Value::Int(i64::MIN)));
        assert_eq!(Value::unary(UnaryOp::Abs, &Value::Int(i64::MIN)), Some(Value::Int(i64::MIN)));
        assert_eq!(int(BinaryOp::Rem, -7, 3), Some(Value::Int(-1)));
        assert_eq!(int(BinaryOp::Div, i64::MIN, -1), Some(Value::Int(i64::MIN)));
    }

    #[test]
    fn bools_count_as_bits() {
        assert_eq!(Value::apply(BinaryOp::Add, &Value::Int(2), &Value::Bool(true)), Some(Value::Int(3)));
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::Float(-2.9).convert(Type::Int), Some(Value::Int(-2)));
        assert_eq!(Value::Float(f64::NAN).convert(Type::Int), Some(Value::Int(0)));
        assert_eq!(Value::from("12").convert(Type::Int), Some(Value::Int(12)));
        assert_eq!(Value::from("12.5").convert(Type::Int), Some(Value::Int(0)));
        assert_eq!(Value::Null.convert(Type::Int), Some(Value::Int(0)));
        assert_eq!(Value::Color(crate::types::color::Color::BLACK).convert(Type::Int), None);
    }
}
