use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::EvalError;
use crate::runtime::value::Value;

pub mod assets;
pub mod math;

pub use assets::AssetProbe;

// ─── Call contract ───────────────────────────────────────────────────────────

/// A named callable. Arguments arrive in source order.
pub trait Fun: Send + Sync {
    fn call(&self, args: &[Value]) -> Result<Value, EvalError>;
}

impl<F> Fun for F
where
    F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync,
{
    fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        self(args)
    }
}

/// Rejects calls with the wrong number of arguments before reaching `inner`.
struct Fixed {
    name: String,
    arity: usize,
    inner: Arc<dyn Fun>,
}

impl Fun for Fixed {
    fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        check_argc(&self.name, args, self.arity)?;
        self.inner.call(args)
    }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Name → function table handed to the evaluator.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    funs: FxHashMap<String, Arc<dyn Fun>>,
}

impl FunctionRegistry {
    pub fn new() -> Self { Self::default() }

    /// Registers a function that checks its own arguments.
    pub fn register(&mut self, name: impl Into<String>, fun: impl Fun + 'static) -> &mut Self {
        self.funs.insert(name.into(), Arc::new(fun));
        self
    }

    /// Registers a function that only ever sees exactly `arity` arguments.
    pub fn register_fixed(&mut self, name: impl Into<String>, arity: usize, fun: impl Fun + 'static) -> &mut Self {
        let name = name.into();
        let fixed = Fixed { name: name.clone(), arity, inner: Arc::new(fun) };
        self.funs.insert(name, Arc::new(fixed));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Fun>> {
        self.funs.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funs.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.funs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Math constants, math functions, `min` and `max`.
    pub fn standard() -> Self {
        let mut r = Self::new();
        math::register(&mut r);
        r
    }

    /// Adds `exists(asset)`, answered by `probe`.
    pub fn with_exists(mut self, probe: Arc<dyn AssetProbe>) -> Self {
        assets::register(&mut self, probe);
        self
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry").field("names", &self.names()).finish()
    }
}

// ─── Shared helpers ──────────────────────────────────────────────────────────

pub(crate) fn check_argc(name: &str, args: &[Value], n: usize) -> Result<(), EvalError> {
    if args.len() != n {
        Err(EvalError::Arity { name: name.to_string(), expected: n, got: args.len() })
    } else {
        Ok(())
    }
}

pub(crate) fn not_applicable(name: &str, args: &[Value]) -> EvalError {
    EvalError::FunctionNotApplicable {
        name: name.to_string(),
        operands: args.iter().map(Value::ty).collect(),
    }
}
