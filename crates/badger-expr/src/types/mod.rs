//! The value type lattice.
//!
//! Every [`Type`] owns a static [`TypeOps`] table. Operators a type does not
//! implement are simply `None` in its table; binary dispatch walks from the
//! higher-ranked operand type down to the lower one (see [`Value::apply`]).
//!
//! [`Value::apply`]: crate::runtime::value::Value::apply

pub mod color;
pub mod compare;
pub mod length;
pub(crate) mod ops;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::runtime::value::Value;
use compare::Compare;

// ─── Type ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Null,
    Bool,
    Int,
    Float,
    #[serde(rename = "str")]
    Str,
    #[serde(rename = "len")]
    Length,
    Angle,
    #[serde(rename = "col")]
    Color,
}

impl Type {
    pub const ALL: [Type; 8] = [
        Type::Null, Type::Bool, Type::Int, Type::Float,
        Type::Str, Type::Length, Type::Angle, Type::Color,
    ];

    /// Stable id used as the operand of `CAST` and `CONV`.
    pub fn id(self) -> u32 {
        match self {
            Type::Null   => 0,
            Type::Bool   => 1,
            Type::Int    => 2,
            Type::Float  => 3,
            Type::Str    => 4,
            Type::Length => 5,
            Type::Angle  => 6,
            Type::Color  => 7,
        }
    }

    pub fn from_id(id: u32) -> Option<Type> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Null   => "null",
            Type::Bool   => "bool",
            Type::Int    => "int",
            Type::Float  => "float",
            Type::Str    => "str",
            Type::Length => "len",
            Type::Angle  => "angle",
            Type::Color  => "col",
        }
    }

    pub fn from_name(name: &str) -> Option<Type> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    pub fn rank(self) -> TypeRank {
        match self {
            Type::Null                 => TypeRank::Null,
            Type::Color                => TypeRank::Col,
            Type::Int                  => TypeRank::Int,
            Type::Float                => TypeRank::Float,
            Type::Angle | Type::Length => TypeRank::Unit,
            Type::Bool                 => TypeRank::Bool,
            Type::Str                  => TypeRank::Str,
        }
    }

    pub(crate) fn ops(self) -> &'static TypeOps {
        match self {
            Type::Null   => &ops::null::OPS,
            Type::Bool   => &ops::bool::OPS,
            Type::Int    => &ops::int::OPS,
            Type::Float  => &ops::float::OPS,
            Type::Str    => &ops::str::OPS,
            Type::Length => &ops::len::OPS,
            Type::Angle  => &ops::angle::OPS,
            Type::Color  => &ops::col::OPS,
        }
    }

    /// Best-effort conversion of `from` into this type.
    pub fn convert(self, from: &Value) -> Option<Value> {
        (self.ops().convert)(from)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dispatch priority of a type. Higher ranks get the first attempt at a
/// binary operator; lower ranks act as the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeRank {
    Null,
    Col,
    Int,
    Float,
    /// Numbers with a unit: angles and lengths.
    Unit,
    Bool,
    /// Anything concatenates to a string, so strings outrank everything.
    Str,
}

// ─── Operator tables ─────────────────────────────────────────────────────────

pub(crate) type ConvertFn = fn(&Value) -> Option<Value>;
pub(crate) type CompareFn = fn(&Value, &Value) -> Compare;
pub(crate) type UnaryFn = fn(&Value) -> Option<Value>;
pub(crate) type BinaryFn = fn(&Value, &Value) -> Option<Value>;

pub(crate) struct TypeOps {
    pub convert: ConvertFn,
    pub compare: CompareFn,

    pub plus:    Option<UnaryFn>,
    pub neg:     Option<UnaryFn>,
    pub abs:     Option<UnaryFn>,
    pub bit_not: Option<UnaryFn>,

    pub add:     Option<BinaryFn>,
    pub sub:     Option<BinaryFn>,
    pub mul:     Option<BinaryFn>,
    pub div:     Option<BinaryFn>,
    pub rem:     Option<BinaryFn>,
    pub shl:     Option<BinaryFn>,
    pub shr:     Option<BinaryFn>,
    pub bit_and: Option<BinaryFn>,
    pub bit_or:  Option<BinaryFn>,
    pub bit_xor: Option<BinaryFn>,
}

impl TypeOps {
    /// A table with no operators. Per-type tables start from this.
    pub const BASE: TypeOps = TypeOps {
        convert: no_convert,
        compare: compare::structural,
        plus: None, neg: None, abs: None, bit_not: None,
        add: None, sub: None, mul: None, div: None, rem: None,
        shl: None, shr: None, bit_and: None, bit_or: None, bit_xor: None,
    };
}

fn no_convert(_: &Value) -> Option<Value> { None }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp { Plus, Neg, Abs, BitNot }

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus   => "+",
            UnaryOp::Neg    => "-",
            UnaryOp::Abs    => "||",
            UnaryOp::BitNot => "~",
        }
    }

    pub(crate) fn select(self, ops: &TypeOps) -> Option<UnaryFn> {
        match self {
            UnaryOp::Plus   => ops.plus,
            UnaryOp::Neg    => ops.neg,
            UnaryOp::Abs    => ops.abs,
            UnaryOp::BitNot => ops.bit_not,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp { Add, Sub, Mul, Div, Rem, Shl, Shr, BitAnd, BitOr, BitXor }

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add    => "+",
            BinaryOp::Sub    => "-",
            BinaryOp::Mul    => "*",
            BinaryOp::Div    => "/",
            BinaryOp::Rem    => "%",
            BinaryOp::Shl    => "<<",
            BinaryOp::Shr    => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr  => "|",
            BinaryOp::BitXor => "^",
        }
    }

    pub(crate) fn select(self, ops: &TypeOps) -> Option<BinaryFn> {
        match self {
            BinaryOp::Add    => ops.add,
            BinaryOp::Sub    => ops.sub,
            BinaryOp::Mul    => ops.mul,
            BinaryOp::Div    => ops.div,
            BinaryOp::Rem    => ops.rem,
            BinaryOp::Shl    => ops.shl,
            BinaryOp::Shr    => ops.shr,
            BinaryOp::BitAnd => ops.bit_and,
            BinaryOp::BitOr  => ops.bit_or,
            BinaryOp::BitXor => ops.bit_xor,
        }
    }
}

// ─── Number formatting ───────────────────────────────────────────────────────

/// Formats a double the way template authors expect to see it: always with a
/// fractional part, and in `E` notation outside `[1e-3, 1e7)`.
pub fn format_double(x: f64) -> String {
    if x.is_nan() {
        return "NaN".into();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }
    let mag = x.abs();
    if x == 0.0 || (1e-3..1e7).contains(&mag) {
        let s = x.to_string();
        return if s.contains('.') { s } else { format!("{s}.0") };
    }
    let s = format!("{x:e}");
    match s.split_once('e') {
        Some((mantissa, exp)) if mantissa.contains('.') => format!("{mantissa}E{exp}"),
        Some((mantissa, exp)) => format!("{mantissa}.0E{exp}"),
        None => s,
    }
}
