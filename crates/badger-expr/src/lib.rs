//! Expression language for badge templates.
//!
//! Text such as `$width - 2 * $pad` is parsed once into a compact [`Expr`]
//! and evaluated many times against a [`Scope`] that maps variable names to
//! their own defining expressions.
//!
//! ```
//! use badger_expr::{LocalScope, ScopeExt, Value, parse_expr};
//!
//! let mut scope = LocalScope::new();
//! scope.set("width", 120i64);
//! scope.set_expr("half", parse_expr("$width / 2").unwrap());
//!
//! let e = parse_expr("$half + 4px").unwrap();
//! assert_eq!(scope.eval(&e).unwrap().string(), "64.0px");
//! ```

pub mod config;
pub mod error;
pub mod functions;
pub mod params;
pub mod runtime;
pub mod scope;
pub mod syntax;
pub mod types;

pub use config::{EvalConfig, Metrics};
pub use error::{Error, ErrorCode, EvalError, SyntaxError};
pub use functions::{AssetProbe, Fun, FunctionRegistry};
pub use params::{ParamError, ParamType, QueryParam, RawDyn, VarType, bind_params};
pub use runtime::expr::{Expr, ExprBuilder, Op};
pub use runtime::machine::{Evaluator, FnEvaluator};
pub use runtime::value::Value;
pub use scope::{Dyn, EmptyScope, LocalScope, Resolver, Scope, ScopeExt, ScopeStack, eval_in};
pub use syntax::parse_expr;
pub use types::Type;
pub use types::color::Color;
pub use types::compare::Compare;
pub use types::length::Length;
