//! Stack machine. Runs a compiled [`Expr`] against an [`Evaluator`] that
//! supplies variables and functions.

use std::sync::Arc;

use tracing::trace;

use crate::error::{Error, EvalError};
use crate::functions::{Fun, FunctionRegistry};
use crate::runtime::expr::{Expr, Instr, Op};
use crate::runtime::value::Value;
use crate::types::compare::Compare;
use crate::types::{BinaryOp, UnaryOp};

// ─── Evaluator ───────────────────────────────────────────────────────────────

/// Where a running expression gets its free variables and functions from.
pub trait Evaluator {
    /// `Ok(None)` means the variable is unbound.
    fn get_var(&mut self, name: &str) -> Result<Option<Value>, Error>;

    fn get_fun(&self, name: &str) -> Option<Arc<dyn Fun>> {
        let _ = name;
        None
    }
}

/// Variables from a closure, functions from an optional registry.
pub struct FnEvaluator<'a, F> {
    vars: F,
    funs: Option<&'a FunctionRegistry>,
}

impl<'a, F> FnEvaluator<'a, F>
where
    F: FnMut(&str) -> Option<Value>,
{
    pub fn new(vars: F) -> Self {
        Self { vars, funs: None }
    }

    pub fn with_functions(mut self, funs: &'a FunctionRegistry) -> Self {
        self.funs = Some(funs);
        self
    }
}

impl<F> Evaluator for FnEvaluator<'_, F>
where
    F: FnMut(&str) -> Option<Value>,
{
    fn get_var(&mut self, name: &str) -> Result<Option<Value>, Error> {
        Ok((self.vars)(name))
    }

    fn get_fun(&self, name: &str) -> Option<Arc<dyn Fun>> {
        self.funs.and_then(|f| f.get(name))
    }
}

impl Expr {
    pub fn eval(&self, ev: &mut dyn Evaluator) -> Result<Value, Error> {
        Machine::default().run(self, ev)
    }

    /// Evaluates with variables from `vars` and no functions.
    pub fn eval_with(&self, vars: impl FnMut(&str) -> Option<Value>) -> Result<Value, Error> {
        self.eval(&mut FnEvaluator::new(vars))
    }
}

// ─── Machine ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Machine {
    stack: Vec<Value>,
}

fn unary_op(op: Op) -> Option<UnaryOp> {
    Some(match op {
        Op::Plus => UnaryOp::Plus,
        Op::Neg  => UnaryOp::Neg,
        Op::Abs  => UnaryOp::Abs,
        Op::BNot => UnaryOp::BitNot,
        _ => return None,
    })
}

fn binary_op(op: Op) -> Option<BinaryOp> {
    Some(match op {
        Op::Add  => BinaryOp::Add,
        Op::Sub  => BinaryOp::Sub,
        Op::Mul  => BinaryOp::Mul,
        Op::Div  => BinaryOp::Div,
        Op::Rem  => BinaryOp::Rem,
        Op::Shl  => BinaryOp::Shl,
        Op::Shr  => BinaryOp::Shr,
        Op::BAnd => BinaryOp::BitAnd,
        Op::BOr  => BinaryOp::BitOr,
        Op::BXor => BinaryOp::BitXor,
        _ => return None,
    })
}

/// Ordering tests. `None` from the test means the operands are incomparable.
fn ordering(op: Op) -> Option<(&'static str, fn(Compare) -> Option<bool>)> {
    Some(match op {
        Op::Lt => ("<", Compare::lt),
        Op::Gt => (">", Compare::gt),
        Op::Le => ("<=", Compare::le),
        Op::Ge => (">=", Compare::ge),
        _ => return None,
    })
}

impl Machine {
    fn pop(&mut self) -> Result<Value, EvalError> {
        self.stack.pop().ok_or(EvalError::StackUnderflow)
    }

    fn pop2(&mut self) -> Result<(Value, Value), EvalError> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;
        Ok((lhs, rhs))
    }

    fn run(mut self, expr: &Expr, ev: &mut dyn Evaluator) -> Result<Value, Error> {
        for instr in expr.decode() {
            match instr? {
                Instr::Simple(op)    => self.simple(op)?,
                Instr::LoadConst(v)  => self.stack.push(v.clone()),
                Instr::LoadVar(name) => {
                    let v = ev.get_var(name)?.ok_or_else(|| EvalError::UnboundVariable(name.to_string()))?;
                    self.stack.push(v);
                }
                Instr::Cast(to) => {
                    let v = self.pop()?;
                    let cast = v.cast(to).cloned().ok_or(EvalError::BadCast { from: v.ty(), to })?;
                    self.stack.push(cast);
                }
                Instr::Conv(to) => {
                    let v = self.pop()?;
                    let conv = v.convert(to).ok_or(EvalError::BadConversion { from: v.ty(), to })?;
                    self.stack.push(conv);
                }
                Instr::Call { name, argc } => {
                    let base = self.stack.len().checked_sub(argc as usize).ok_or(EvalError::StackUnderflow)?;
                    // Arguments were emitted last-to-first, so the top of the stack is the first one.
                    let args: Vec<Value> = self.stack.drain(base..).rev().collect();
                    let fun = ev.get_fun(name).ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
                    trace!(name, argc, "call");
                    self.stack.push(fun.call(&args)?);
                }
            }
        }

        let [result] = <[Value; 1]>::try_from(self.stack).map_err(|_| EvalError::Incomplete)?;
        Ok(result)
    }

    fn simple(&mut self, op: Op) -> Result<(), EvalError> {
        if let Some(u) = unary_op(op) {
            let v = self.pop()?;
            let r = Value::unary(u, &v)
                .ok_or_else(|| EvalError::NotApplicable { op: u.symbol(), operands: vec![v.ty()] })?;
            self.stack.push(r);
            return Ok(());
        }

        if let Some(b) = binary_op(op) {
            let (lhs, rhs) = self.pop2()?;
            let r = Value::checked_apply(b, &lhs, &rhs)?
                .ok_or_else(|| EvalError::NotApplicable { op: b.symbol(), operands: vec![lhs.ty(), rhs.ty()] })?;
            self.stack.push(r);
            return Ok(());
        }

        if let Some((symbol, test)) = ordering(op) {
            let (lhs, rhs) = self.pop2()?;
            let r = test(Value::compare(&lhs, &rhs))
                .ok_or_else(|| EvalError::NotApplicable { op: symbol, operands: vec![lhs.ty(), rhs.ty()] })?;
            self.stack.push(Value::Bool(r));
            return Ok(());
        }

        match op {
            Op::Noop => {}
            Op::Dup => {
                let v = self.stack.last().cloned().ok_or(EvalError::StackUnderflow)?;
                self.stack.push(v);
            }
            Op::Pop => {
                self.pop()?;
            }
            Op::Swap => {
                let n = self.stack.len();
                if n < 2 {
                    return Err(EvalError::StackUnderflow);
                }
                self.stack.swap(n - 1, n - 2);
            }

            Op::LAnd => self.logic2(Value::logic_and)?,
            Op::LOr  => self.logic2(Value::logic_or)?,
            Op::LXor => self.logic2(Value::logic_xor)?,
            Op::LNot => {
                let v = self.pop()?;
                self.stack.push(Value::logic_not(&v));
            }

            Op::Eq | Op::Neq => {
                let (lhs, rhs) = self.pop2()?;
                let eq = Value::compare(&lhs, &rhs).eq();
                self.stack.push(Value::Bool(eq == (op == Op::Eq)));
            }
            Op::Same | Op::NSame => {
                let (lhs, rhs) = self.pop2()?;
                self.stack.push(Value::Bool((lhs == rhs) == (op == Op::Same)));
            }

            Op::LdNull => self.stack.push(Value::Null),
            Op::Cond => {
                let no = self.pop()?;
                let yes = self.pop()?;
                let cond = self.pop()?;
                self.stack.push(if cond.truth() { yes } else { no });
            }

            // Operand-carrying ops decode to their own `Instr` variants; the
            // arithmetic families were handled above.
            _ => return Err(EvalError::InvalidOpcode(op.code())),
        }
        Ok(())
    }

    fn logic2(&mut self, f: fn(&Value, &Value) -> Value) -> Result<(), EvalError> {
        let (lhs, rhs) = self.pop2()?;
        self.stack.push(f(&lhs, &rhs));
        Ok(())
    }
}
