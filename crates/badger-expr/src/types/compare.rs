use std::cmp::Ordering;

use crate::runtime::value::Value;

/// Outcome of comparing two values. `Incomparable` covers values that are
/// unequal without either one being less than the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compare {
    Equal,
    Less,
    Greater,
    Incomparable,
}

impl Compare {
    pub fn lt(self) -> Option<bool> {
        match self {
            Compare::Equal        => Some(false),
            Compare::Less         => Some(true),
            Compare::Greater      => Some(false),
            Compare::Incomparable => None,
        }
    }

    pub fn gt(self) -> Option<bool> {
        match self {
            Compare::Equal        => Some(false),
            Compare::Less         => Some(false),
            Compare::Greater      => Some(true),
            Compare::Incomparable => None,
        }
    }

    pub fn le(self) -> Option<bool> {
        match self {
            Compare::Equal        => Some(true),
            Compare::Less         => Some(true),
            Compare::Greater      => Some(false),
            Compare::Incomparable => None,
        }
    }

    pub fn ge(self) -> Option<bool> {
        match self {
            Compare::Equal        => Some(true),
            Compare::Less         => Some(false),
            Compare::Greater      => Some(true),
            Compare::Incomparable => None,
        }
    }

    pub fn eq(self) -> bool {
        self == Compare::Equal
    }

    pub fn of<T: Ord + ?Sized>(lhs: &T, rhs: &T) -> Compare {
        lhs.cmp(rhs).into()
    }

    /// Total order over doubles: NaN equals itself and sits above every other
    /// value, and `-0.0` sorts below `0.0`.
    pub fn of_f64(lhs: f64, rhs: f64) -> Compare {
        match (lhs.is_nan(), rhs.is_nan()) {
            (true, true)   => Compare::Equal,
            (true, false)  => Compare::Greater,
            (false, true)  => Compare::Less,
            (false, false) => lhs.total_cmp(&rhs).into(),
        }
    }
}

impl From<Ordering> for Compare {
    fn from(ord: Ordering) -> Self {
        match ord {
            Ordering::Less    => Compare::Less,
            Ordering::Equal   => Compare::Equal,
            Ordering::Greater => Compare::Greater,
        }
    }
}

/// Fallback comparator: equal when both values are identical, incomparable
/// otherwise.
pub(crate) fn structural(lhs: &Value, rhs: &Value) -> Compare {
    if lhs == rhs { Compare::Equal } else { Compare::Incomparable }
}
