use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::EvalError;
use crate::types::color::Color;
use crate::types::compare::Compare;
use crate::types::length::Length;
use crate::types::{BinaryOp, Type, UnaryOp, format_double, ops};

/// A typed runtime value.
///
/// Equality is structural on type and payload. Doubles compare by bit
/// pattern, so `NaN` equals itself and `-0.0` differs from `0.0`.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Radians.
    Angle(f64),
    Length(Length),
    Color(Color),
    Str(String),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Null      => Type::Null,
            Value::Bool(_)   => Type::Bool,
            Value::Int(_)    => Type::Int,
            Value::Float(_)  => Type::Float,
            Value::Angle(_)  => Type::Angle,
            Value::Length(_) => Type::Length,
            Value::Color(_)  => Type::Color,
            Value::Str(_)    => Type::Str,
        }
    }

    pub fn truth(&self) -> bool {
        match self {
            Value::Null      => false,
            Value::Bool(b)   => *b,
            Value::Int(i)    => *i != 0,
            Value::Float(f)  => *f != 0.0,
            Value::Angle(a)  => *a != 0.0,
            Value::Length(l) => !l.is_zero(),
            Value::Color(c)  => !c.is_fully_transparent(),
            Value::Str(s)    => !s.is_empty(),
        }
    }

    /// The value as template output would print it.
    pub fn string(&self) -> String {
        match self {
            Value::Null      => "null".into(),
            Value::Bool(b)   => b.to_string(),
            Value::Int(i)    => i.to_string(),
            Value::Float(f)  => format_double(*f),
            Value::Angle(a)  => format!("{} rad", format_double(*a)),
            Value::Length(l) => l.to_string(),
            Value::Color(c)  => c.to_string(),
            Value::Str(s)    => s.clone(),
        }
    }

    pub fn is_type(&self, ty: Type) -> bool {
        self.ty() == ty
    }

    /// Exact-type narrowing: succeeds only if the value already has type `to`.
    pub fn cast(&self, to: Type) -> Option<&Value> {
        self.is_type(to).then_some(self)
    }

    /// Best-effort conversion. Identity when the type already matches.
    pub fn convert(&self, to: Type) -> Option<Value> {
        match self.cast(to) {
            Some(v) => Some(v.clone()),
            None    => to.convert(self),
        }
    }

    // ── payload accessors ────────────────────────────────────────────────────

    pub fn as_bool(&self) -> Option<bool> {
        match self { Value::Bool(b) => Some(*b), _ => None }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self { Value::Int(i) => Some(*i), _ => None }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self { Value::Float(f) => Some(*f), _ => None }
    }

    pub fn as_angle(&self) -> Option<f64> {
        match self { Value::Angle(a) => Some(*a), _ => None }
    }

    pub fn as_length(&self) -> Option<Length> {
        match self { Value::Length(l) => Some(*l), _ => None }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self { Value::Color(c) => Some(*c), _ => None }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self { Value::Str(s) => Some(s), _ => None }
    }

    // ── operators ────────────────────────────────────────────────────────────

    pub fn unary(op: UnaryOp, value: &Value) -> Option<Value> {
        op.select(value.ty().ops()).and_then(|f| f(value))
    }

    /// Rank dispatch: the higher-ranked operand type gets the first attempt,
    /// the lower-ranked one is the fallback. Equal ranks favor the left side.
    pub fn apply(op: BinaryOp, lhs: &Value, rhs: &Value) -> Option<Value> {
        let (l, r) = (lhs.ty(), rhs.ty());
        let (hi, lo) = if r.rank() > l.rank() { (r, l) } else { (l, r) };
        op.select(hi.ops()).and_then(|f| f(lhs, rhs))
            .or_else(|| op.select(lo.ops()).and_then(|f| f(lhs, rhs)))
    }

    /// Like [`Value::apply`], but integer division or remainder by zero is
    /// an error instead of a panic.
    pub fn checked_apply(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Option<Value>, EvalError> {
        if matches!(op, BinaryOp::Div | BinaryOp::Rem) && ops::int::divides_by_zero(lhs, rhs) {
            return Err(EvalError::DivisionByZero);
        }
        Ok(Self::apply(op, lhs, rhs))
    }

    /// Only the higher-ranked type's comparator runs. There is no fallback:
    /// a pair that comparator cannot handle is incomparable.
    pub fn compare(lhs: &Value, rhs: &Value) -> Compare {
        let (l, r) = (lhs.ty(), rhs.ty());
        let hi = if r.rank() > l.rank() { r } else { l };
        (hi.ops().compare)(lhs, rhs)
    }

    pub fn logic_and(lhs: &Value, rhs: &Value) -> Value { Value::Bool(lhs.truth() && rhs.truth()) }
    pub fn logic_or(lhs: &Value, rhs: &Value) -> Value { Value::Bool(lhs.truth() || rhs.truth()) }
    pub fn logic_xor(lhs: &Value, rhs: &Value) -> Value { Value::Bool(lhs.truth() != rhs.truth()) }
    pub fn logic_not(value: &Value) -> Value { Value::Bool(!value.truth()) }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null)           => true,
            (Value::Bool(a), Value::Bool(b))     => a == b,
            (Value::Int(a), Value::Int(b))       => a == b,
            (Value::Float(a), Value::Float(b))   => a.to_bits() == b.to_bits(),
            (Value::Angle(a), Value::Angle(b))   => a.to_bits() == b.to_bits(),
            (Value::Length(a), Value::Length(b)) => a.bits() == b.bits(),
            (Value::Color(a), Value::Color(b))   => a == b,
            (Value::Str(a), Value::Str(b))       => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty().hash(state);
        match self {
            Value::Null      => {}
            Value::Bool(b)   => b.hash(state),
            Value::Int(i)    => i.hash(state),
            Value::Float(f)  => f.to_bits().hash(state),
            Value::Angle(a)  => a.to_bits().hash(state),
            Value::Length(l) => l.bits().hash(state),
            Value::Color(c)  => c.hash(state),
            Value::Str(s)    => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty(), self.string())
    }
}

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Float(v) } }
impl From<Length> for Value { fn from(v: Length) -> Self { Value::Length(v) } }
impl From<Color> for Value { fn from(v: Color) -> Self { Value::Color(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::Str(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::Str(v.to_owned()) } }
