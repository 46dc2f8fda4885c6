//! Values that are only known once a scope is available.
//!
//! A [`Dyn`] pairs an expression with the Rust type its result is wanted as.
//! Template attributes hold these and resolve them per render.

use std::fmt;
use std::sync::Arc;

use super::Scope;
use super::resolve::eval_in;
use crate::error::Error;
use crate::runtime::expr::Expr;
use crate::runtime::value::Value;
use crate::types::Type;
use crate::types::color::Color;
use crate::types::length::Length;

type Unwrap<T> = Arc<dyn Fn(Value) -> Result<T, Error> + Send + Sync>;
type Resolve<T> = Arc<dyn Fn(&dyn Scope) -> Result<T, Error> + Send + Sync>;

#[derive(Clone)]
pub enum Dyn<T> {
    Const(T),
    Eval(Expr, Unwrap<T>),
    /// Another deferred value with a transform applied after resolution.
    Map(Resolve<T>),
}

impl<T: Clone> Dyn<T> {
    pub fn constant(value: T) -> Self {
        Dyn::Const(value)
    }

    pub fn eval(expr: Expr, unwrap: impl Fn(Value) -> Result<T, Error> + Send + Sync + 'static) -> Self {
        Dyn::Eval(expr, Arc::new(unwrap))
    }

    pub fn via(&self, scope: &dyn Scope) -> Result<T, Error> {
        match self {
            Dyn::Const(v) => Ok(v.clone()),
            Dyn::Eval(expr, unwrap) => unwrap(eval_in(scope, expr)?),
            Dyn::Map(resolve) => resolve(scope),
        }
    }

    pub fn as_constant(&self) -> Option<&T> {
        match self {
            Dyn::Const(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Dyn<U>
    where
        T: Send + Sync + 'static,
        U: 'static,
    {
        match self {
            Dyn::Const(v) => Dyn::Const(f(v)),
            inner => Dyn::Map(Arc::new(move |scope: &dyn Scope| inner.via(scope).map(&f))),
        }
    }
}

impl<T> From<T> for Dyn<T> {
    fn from(value: T) -> Self {
        Dyn::Const(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Dyn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dyn::Const(v) => f.debug_tuple("Const").field(v).finish(),
            Dyn::Eval(expr, _) => write!(f, "Eval({expr})"),
            Dyn::Map(_) => f.write_str("Map(..)"),
        }
    }
}

fn converted(value: Value, to: Type) -> Result<Value, Error> {
    value.convert(to).ok_or(Error::Conversion { from: value.ty(), to })
}

fn extract<T>(value: Value, to: Type, get: fn(&Value) -> Option<T>) -> Result<T, Error> {
    let from = value.ty();
    get(&converted(value, to)?).ok_or(Error::Conversion { from, to })
}

impl Dyn<Value> {
    /// Converts the result to `ty`, failing if no conversion exists.
    pub fn eval_as(expr: Expr, ty: Type) -> Self {
        Dyn::eval(expr, move |v| converted(v, ty))
    }
}

impl Dyn<Option<Value>> {
    /// Like [`Dyn::eval_as`], but a null result is `None`.
    pub fn opt_eval_as(expr: Expr, ty: Type) -> Self {
        Dyn::eval(expr, move |v| match v {
            Value::Null => Ok(None),
            v => converted(v, ty).map(Some),
        })
    }
}

macro_rules! typed {
    ($name:ident, $opt:ident, $t:ty, $ty:expr, $get:expr) => {
        impl Dyn<$t> {
            pub fn $name(expr: Expr) -> Self {
                Dyn::eval(expr, |v| extract(v, $ty, $get))
            }
        }

        impl Dyn<Option<$t>> {
            pub fn $opt(expr: Expr) -> Self {
                Dyn::eval(expr, |v| match v {
                    Value::Null => Ok(None),
                    v => extract(v, $ty, $get).map(Some),
                })
            }
        }
    };
}

typed!(string,  opt_string,  String, Type::Str,    |v| v.as_str().map(str::to_owned));
typed!(boolean, opt_boolean, bool,   Type::Bool,   Value::as_bool);
typed!(double,  opt_double,  f64,    Type::Float,  Value::as_float);
typed!(float,   opt_float,   f32,    Type::Float,  |v| v.as_float().map(|f| f as f32));
typed!(long,    opt_long,    i64,    Type::Int,    Value::as_int);
typed!(int,     opt_int,     i32,    Type::Int,    |v| v.as_int().map(|i| i as i32));
typed!(length,  opt_length,  Length, Type::Length, Value::as_length);
typed!(col,     opt_col,     Color,  Type::Color,  Value::as_color);
typed!(angle,   opt_angle,   f64,    Type::Angle,  Value::as_angle);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{EmptyScope, LocalScope};
    use crate::syntax::parse_expr;

    fn expr(src: &str) -> Expr {
        parse_expr(src).unwrap()
    }

    #[test]
    fn constants_skip_evaluation() {
        let d = Dyn::constant(5i64);
        assert_eq!(d.as_constant(), Some(&5));
        assert_eq!(d.via(&EmptyScope), Ok(5));
    }

    #[test]
    fn typed_constructors_convert() {
        let mut s = LocalScope::new();
        s.set("w", 12i64);
        assert_eq!(Dyn::<String>::string(expr("$w * 2")).via(&s), Ok("24".to_string()));
        assert_eq!(Dyn::<f64>::double(expr("$w / 5")).via(&s), Ok(2.0));
        assert_eq!(Dyn::<i32>::int(expr("'7'")).via(&s), Ok(7));
        assert_eq!(Dyn::<bool>::boolean(expr("$w")).via(&s), Ok(true));
        assert_eq!(Dyn::<Length>::length(expr("$w")).via(&s), Ok(Length::pixels(12.0)));
        assert_eq!(Dyn::<Color>::col(expr("'#fff'")).via(&s), Ok(Color::rgb(255, 255, 255)));
    }

    #[test]
    fn failed_conversion() {
        let err = Dyn::<i64>::long(expr("5px")).via(&EmptyScope).unwrap_err();
        assert_eq!(err, Error::Conversion { from: Type::Length, to: Type::Int });
        assert_eq!(err.to_string(), "Can't convert len to int");
    }

    #[test]
    fn optional_null_is_none() {
        assert_eq!(Dyn::<Option<i64>>::opt_long(expr("null")).via(&EmptyScope), Ok(None));
        assert_eq!(Dyn::<Option<i64>>::opt_long(expr("2.9")).via(&EmptyScope), Ok(Some(2)));
        assert_eq!(Dyn::opt_eval_as(expr("null"), Type::Str).via(&EmptyScope), Ok(None));
    }

    #[test]
    fn eval_as_keeps_value() {
        let d = Dyn::eval_as(expr("1 + 1"), Type::Float);
        assert_eq!(d.via(&EmptyScope), Ok(Value::Float(2.0)));
    }

    #[test]
    fn map_runs_after_resolution() {
        let mut s = LocalScope::new();
        s.set("n", 3i64);
        let d = Dyn::<i64>::long(expr("$n")).map(|n| n * 10);
        assert_eq!(d.via(&s), Ok(30));
        let c = Dyn::constant(2i64).map(|n| n + 1);
        assert_eq!(c.as_constant(), Some(&3));
    }

    #[test]
    fn errors_propagate() {
        let d = Dyn::<String>::string(expr("$missing"));
        assert!(matches!(d.via(&EmptyScope), Err(Error::Eval(_))));
    }
}
