use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use super::Scope;
use crate::config::EvalConfig;
use crate::error::{Error, EvalError};
use crate::functions::{Fun, FunctionRegistry};
use crate::runtime::expr::Expr;
use crate::runtime::machine::Evaluator;
use crate::runtime::value::Value;

/// Resolution state for one top-level evaluation.
///
/// Each variable is resolved at most once: its value (or the fact that it is
/// unbound) is memoized for the rest of the evaluation. Names whose
/// definitions are still being evaluated are tracked so that a definition
/// reaching back to itself, directly or through other variables, fails with
/// [`Error::SelfDependency`] instead of recursing forever.
pub struct Resolver<'s> {
    scope: &'s dyn Scope,
    functions: Option<&'s FunctionRegistry>,
    max_depth: usize,
    resolved: FxHashMap<String, Option<Value>>,
    resolving: FxHashSet<String>,
}

impl<'s> Resolver<'s> {
    /// Functions and limits come from the scope when it provides them.
    pub fn new(scope: &'s dyn Scope) -> Self {
        let max_depth = scope.config().map_or(EvalConfig::DEFAULT_MAX_DEPTH, |c| c.max_depth);
        Self {
            scope,
            functions: scope.functions(),
            max_depth,
            resolved: FxHashMap::default(),
            resolving: FxHashSet::default(),
        }
    }

    pub fn with_functions(mut self, functions: &'s FunctionRegistry) -> Self {
        self.functions = Some(functions);
        self
    }

    pub fn with_config(mut self, config: &EvalConfig) -> Self {
        self.max_depth = config.max_depth;
        self
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value, Error> {
        expr.eval(self)
    }

    fn resolve(&mut self, name: &str) -> Result<Option<Value>, Error> {
        if let Some(v) = self.resolved.get(name) {
            return Ok(v.clone());
        }
        if self.resolving.contains(name) {
            debug!(name, "variable depends on itself");
            return Err(Error::SelfDependency(name.to_string()));
        }
        if self.resolving.len() >= self.max_depth {
            return Err(EvalError::TooDeep(self.max_depth).into());
        }

        let scope = self.scope;
        let Some(expr) = scope.get(name) else {
            trace!(name, "unbound");
            self.resolved.insert(name.to_string(), None);
            return Ok(None);
        };

        trace!(name, depth = self.resolving.len(), "resolving");
        self.resolving.insert(name.to_string());
        let result = expr.eval(self);
        self.resolving.remove(name);

        let value = result?;
        self.resolved.insert(name.to_string(), Some(value.clone()));
        Ok(Some(value))
    }
}

impl Evaluator for Resolver<'_> {
    fn get_var(&mut self, name: &str) -> Result<Option<Value>, Error> {
        self.resolve(name)
    }

    fn get_fun(&self, name: &str) -> Option<Arc<dyn Fun>> {
        self.functions.and_then(|f| f.get(name))
    }
}

/// Evaluates `expr` with its free variables taken from `scope`.
pub fn eval_in(scope: &dyn Scope, expr: &Expr) -> Result<Value, Error> {
    Resolver::new(scope).eval(expr)
}

pub trait ScopeExt {
    fn eval(&self, expr: &Expr) -> Result<Value, Error>;
}

impl<S: Scope> ScopeExt for S {
    fn eval(&self, expr: &Expr) -> Result<Value, Error> {
        eval_in(self, expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::LocalScope;
    use crate::syntax::parse_expr;

    fn scope(defs: &[(&str, &str)]) -> LocalScope {
        let mut s = LocalScope::new();
        for (name, src) in defs {
            s.set_expr(*name, parse_expr(src).unwrap());
        }
        s
    }

    fn eval(s: &LocalScope, src: &str) -> Result<Value, Error> {
        s.eval(&parse_expr(src).unwrap())
    }

    #[test]
    fn chains_resolve() {
        let s = scope(&[("a", "$b + 1"), ("b", "$c * 2"), ("c", "20")]);
        assert_eq!(eval(&s, "$a"), Ok(Value::Int(41)));
    }

    #[test]
    fn direct_self_dependency() {
        let s = scope(&[("a", "$a + 1")]);
        let err = eval(&s, "$a").unwrap_err();
        assert_eq!(err, Error::SelfDependency("a".into()));
        assert_eq!(err.to_string(), "Variable 'a' is dependent on itself");
    }

    #[test]
    fn indirect_self_dependency() {
        let s = scope(&[("a", "$b"), ("b", "$c"), ("c", "$a")]);
        assert!(matches!(eval(&s, "$b"), Err(Error::SelfDependency(_))));
    }

    #[test]
    fn repeated_reference_is_not_a_cycle() {
        let s = scope(&[("a", "$b + $b"), ("b", "$c + $c"), ("c", "1")]);
        assert_eq!(eval(&s, "$a * $a"), Ok(Value::Int(16)));
    }

    #[test]
    fn unbound_variable() {
        let s = scope(&[("a", "$missing")]);
        assert_eq!(eval(&s, "$a"), Err(Error::Eval(EvalError::UnboundVariable("missing".into()))));
    }

    #[test]
    fn memo_does_not_leak_between_calls() {
        let mut s = scope(&[("a", "1")]);
        let e = parse_expr("$a").unwrap();
        assert_eq!(s.eval(&e), Ok(Value::Int(1)));
        s.set("a", 2i64);
        assert_eq!(s.eval(&e), Ok(Value::Int(2)));
    }

    #[test]
    fn depth_limit() {
        let mut s = LocalScope::new();
        for i in 0..20 {
            s.set_expr(format!("v{i}"), parse_expr(&format!("$v{} + 1", i + 1)).unwrap());
        }
        s.set("v20", 0i64);
        let e = parse_expr("$v0").unwrap();
        assert_eq!(Resolver::new(&s).eval(&e), Ok(Value::Int(20)));
        let limited = Resolver::new(&s).with_config(&EvalConfig { max_depth: 5 }).eval(&e);
        assert_eq!(limited, Err(Error::Eval(EvalError::TooDeep(5))));
    }

    #[test]
    fn functions_come_from_resolver() {
        let s = scope(&[("r", "2")]);
        let e = parse_expr("max($r, 3)").unwrap();
        assert_eq!(s.eval(&e), Err(Error::Eval(EvalError::UnknownFunction("max".into()))));
        let funs = FunctionRegistry::standard();
        assert_eq!(Resolver::new(&s).with_functions(&funs).eval(&e), Ok(Value::Int(3)));
    }
}
