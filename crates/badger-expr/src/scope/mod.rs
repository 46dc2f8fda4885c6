//! Name → expression environments.
//!
//! A scope maps variable names to the *expressions* that define them, not to
//! values. Values are produced on demand by [`resolve::Resolver`], which
//! follows references between definitions and rejects cycles.

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::config::EvalConfig;
use crate::functions::FunctionRegistry;
use crate::runtime::expr::Expr;
use crate::runtime::value::Value;

pub mod dyn_value;
pub mod resolve;

pub use dyn_value::Dyn;
pub use resolve::{Resolver, ScopeExt, eval_in};

pub trait Scope: Send + Sync {
    /// The defining expression of `name`, if this scope has one.
    fn get(&self, name: &str) -> Option<&Expr>;

    /// Functions available to expressions evaluated in this scope.
    fn functions(&self) -> Option<&FunctionRegistry> {
        None
    }

    fn config(&self) -> Option<&EvalConfig> {
        None
    }
}

// ─── EmptyScope ──────────────────────────────────────────────────────────────

/// Defines nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScope;

impl Scope for EmptyScope {
    fn get(&self, _name: &str) -> Option<&Expr> {
        None
    }
}

// ─── LocalScope ──────────────────────────────────────────────────────────────

/// A plain mutable variable table.
#[derive(Debug, Clone, Default)]
pub struct LocalScope {
    vars: FxHashMap<String, Expr>,
}

impl LocalScope {
    pub fn new() -> Self { Self::default() }

    /// Binds `name` to a constant.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), Expr::constant(value));
    }

    /// Binds `name` to an expression, evaluated each time it is resolved.
    pub fn set_expr(&mut self, name: impl Into<String>, expr: Expr) {
        self.vars.insert(name.into(), expr);
    }

    pub fn unset(&mut self, name: &str) -> Option<Expr> {
        self.vars.remove(name)
    }

    pub fn len(&self) -> usize { self.vars.len() }
    pub fn is_empty(&self) -> bool { self.vars.is_empty() }

    /// Defined names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Scope for LocalScope {
    fn get(&self, name: &str) -> Option<&Expr> {
        self.vars.get(name)
    }
}

// ─── ScopeStack ──────────────────────────────────────────────────────────────

/// An ordered chain of scopes, searched front to back. Itself a scope, so
/// stacks nest.
#[derive(Clone, Default)]
pub struct ScopeStack {
    scopes: VecDeque<Arc<dyn Scope>>,
    functions: Option<Arc<FunctionRegistry>>,
    config: Option<EvalConfig>,
}

impl ScopeStack {
    pub fn new() -> Self { Self::default() }

    pub fn with_functions(mut self, functions: Arc<FunctionRegistry>) -> Self {
        self.functions = Some(functions);
        self
    }

    pub fn with_config(mut self, config: EvalConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn len(&self) -> usize { self.scopes.len() }
    pub fn is_empty(&self) -> bool { self.scopes.is_empty() }

    /// Adds a scope that is searched before all others.
    pub fn push_front(&mut self, scope: Arc<dyn Scope>) {
        self.scopes.push_front(scope);
    }

    /// Adds a scope that is searched after all others.
    pub fn push_back(&mut self, scope: Arc<dyn Scope>) {
        self.scopes.push_back(scope);
    }

    pub fn pop_front(&mut self) -> Option<Arc<dyn Scope>> {
        self.scopes.pop_front()
    }

    pub fn pop_back(&mut self) -> Option<Arc<dyn Scope>> {
        self.scopes.pop_back()
    }

    /// Pushes `scope` to the front until the guard is dropped.
    pub fn front_guard(&mut self, scope: Arc<dyn Scope>) -> FrontGuard<'_> {
        self.push_front(scope);
        FrontGuard { stack: self }
    }

    /// Pushes `scope` to the back until the guard is dropped.
    pub fn back_guard(&mut self, scope: Arc<dyn Scope>) -> BackGuard<'_> {
        self.push_back(scope);
        BackGuard { stack: self }
    }

    /// Runs `action` with `scope` in front. The scope is popped again however
    /// `action` exits, including by panic.
    pub fn with_front<R>(&mut self, scope: Arc<dyn Scope>, action: impl FnOnce(&mut ScopeStack) -> R) -> R {
        let mut guard = self.front_guard(scope);
        action(&mut guard)
    }

    /// Runs `action` with `scope` at the back. The scope is popped again
    /// however `action` exits, including by panic.
    pub fn with_back<R>(&mut self, scope: Arc<dyn Scope>, action: impl FnOnce(&mut ScopeStack) -> R) -> R {
        let mut guard = self.back_guard(scope);
        action(&mut guard)
    }
}

impl Scope for ScopeStack {
    fn get(&self, name: &str) -> Option<&Expr> {
        self.scopes.iter().find_map(|s| s.get(name))
    }

    fn functions(&self) -> Option<&FunctionRegistry> {
        self.functions.as_deref()
    }

    fn config(&self) -> Option<&EvalConfig> {
        self.config.as_ref()
    }
}

impl fmt::Debug for ScopeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeStack")
            .field("scopes", &self.scopes.len())
            .field("functions", &self.functions)
            .field("config", &self.config)
            .finish()
    }
}

// ─── Guards ──────────────────────────────────────────────────────────────────

/// Pops the front scope on drop.
pub struct FrontGuard<'a> {
    stack: &'a mut ScopeStack,
}

impl Drop for FrontGuard<'_> {
    fn drop(&mut self) {
        self.stack.pop_front();
    }
}

impl Deref for FrontGuard<'_> {
    type Target = ScopeStack;
    fn deref(&self) -> &ScopeStack { self.stack }
}

impl DerefMut for FrontGuard<'_> {
    fn deref_mut(&mut self) -> &mut ScopeStack { self.stack }
}

/// Pops the back scope on drop.
pub struct BackGuard<'a> {
    stack: &'a mut ScopeStack,
}

impl Drop for BackGuard<'_> {
    fn drop(&mut self) {
        self.stack.pop_back();
    }
}

impl Deref for BackGuard<'_> {
    type Target = ScopeStack;
    fn deref(&self) -> &ScopeStack { self.stack }
}

impl DerefMut for BackGuard<'_> {
    fn deref_mut(&mut self) -> &mut ScopeStack { self.stack }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn local(pairs: &[(&str, i64)]) -> Arc<dyn Scope> {
        let mut s = LocalScope::new();
        for (name, v) in pairs {
            s.set(*name, *v);
        }
        Arc::new(s)
    }

    fn lookup(scope: &dyn Scope, name: &str) -> Option<Value> {
        scope.get(name).and_then(Expr::as_constant)
    }

    #[test]
    fn local_scope_set_unset() {
        let mut s = LocalScope::new();
        s.set("b", 1i64);
        s.set_expr("a", Expr::name("b"));
        assert_eq!(s.names(), vec!["a", "b"]);
        assert_eq!(lookup(&s, "b"), Some(Value::Int(1)));
        assert!(s.unset("a").is_some());
        assert_eq!(s.len(), 1);
        assert!(s.get("a").is_none());
    }

    #[test]
    fn empty_scope() {
        assert!(EmptyScope.get("x").is_none());
    }

    #[test]
    fn front_wins() {
        let mut stack = ScopeStack::new();
        stack.push_front(local(&[("x", 1), ("y", 1)]));
        stack.push_front(local(&[("x", 2)]));
        assert_eq!(lookup(&stack, "x"), Some(Value::Int(2)));
        assert_eq!(lookup(&stack, "y"), Some(Value::Int(1)));
        stack.push_back(local(&[("x", 3), ("z", 3)]));
        assert_eq!(lookup(&stack, "x"), Some(Value::Int(2)));
        assert_eq!(lookup(&stack, "z"), Some(Value::Int(3)));
    }

    #[test]
    fn with_front_pops_after() {
        let mut stack = ScopeStack::new();
        stack.push_back(local(&[("x", 1)]));
        let inner = stack.with_front(local(&[("x", 2)]), |s| lookup(&*s, "x"));
        assert_eq!(inner, Some(Value::Int(2)));
        assert_eq!(stack.len(), 1);
        assert_eq!(lookup(&stack, "x"), Some(Value::Int(1)));
    }

    #[test]
    fn with_back_pops_after() {
        let mut stack = ScopeStack::new();
        let inner = stack.with_back(local(&[("x", 2)]), |s| lookup(&*s, "x"));
        assert_eq!(inner, Some(Value::Int(2)));
        assert!(stack.is_empty());
    }

    #[test]
    fn guard_pops_on_panic() {
        let mut stack = ScopeStack::new();
        stack.push_back(local(&[("x", 1)]));
        let result = catch_unwind(AssertUnwindSafe(|| {
            stack.with_front(local(&[("x", 2)]), |_| panic!("boom"))
        }));
        assert!(result.is_err());
        assert_eq!(stack.len(), 1);
        assert_eq!(lookup(&stack, "x"), Some(Value::Int(1)));
    }

    #[test]
    fn stacks_nest() {
        let mut inner = ScopeStack::new();
        inner.push_front(local(&[("x", 7)]));
        let mut outer = ScopeStack::new();
        outer.push_back(Arc::new(inner));
        assert_eq!(lookup(&outer, "x"), Some(Value::Int(7)));
    }
}
