//! Compiled expressions.
//!
//! An [`Expr`] is a flat `u32` instruction stream plus two interned pools:
//! constants and names. Instructions that take operands store pool indices or
//! type ids inline right after the opcode:
//!
//! ```text
//! LDC  <const>      LDV  <name>
//! CAST <type id>    CONV <type id>
//! CALL <name> <argc>
//! ```
//!
//! Expressions are immutable and cheap to clone; the same `Expr` can be
//! evaluated any number of times against different scopes.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::EvalError;
use crate::runtime::value::Value;
use crate::types::Type;

// ─── Opcodes ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Op {
    Noop   = 0x00,
    Dup    = 0x01,
    Pop    = 0x02,
    Swap   = 0x03,

    Plus   = 0x10,
    Neg    = 0x11,
    Abs    = 0x12,
    Add    = 0x13,
    Sub    = 0x14,
    Mul    = 0x15,
    Div    = 0x16,
    Rem    = 0x17,

    Shl    = 0x20,
    Shr    = 0x21,
    BAnd   = 0x22,
    BOr    = 0x23,
    BXor   = 0x24,
    BNot   = 0x25,

    LAnd   = 0x30,
    LOr    = 0x31,
    LXor   = 0x32,
    LNot   = 0x33,

    Lt     = 0x40,
    Gt     = 0x41,
    Le     = 0x42,
    Ge     = 0x43,
    Eq     = 0x44,
    Neq    = 0x45,
    Same   = 0x46,
    NSame  = 0x47,

    LdNull = 0x50,
    Ldc    = 0x51,
    Ldv    = 0x52,

    Cast   = 0x60,
    Conv   = 0x61,

    Cond   = 0x70,

    Call   = 0x80,
}

impl Op {
    const ALL: [Op; 37] = [
        Op::Noop, Op::Dup, Op::Pop, Op::Swap,
        Op::Plus, Op::Neg, Op::Abs, Op::Add, Op::Sub, Op::Mul, Op::Div, Op::Rem,
        Op::Shl, Op::Shr, Op::BAnd, Op::BOr, Op::BXor, Op::BNot,
        Op::LAnd, Op::LOr, Op::LXor, Op::LNot,
        Op::Lt, Op::Gt, Op::Le, Op::Ge, Op::Eq, Op::Neq, Op::Same, Op::NSame,
        Op::LdNull, Op::Ldc, Op::Ldv,
        Op::Cast, Op::Conv,
        Op::Cond,
        Op::Call,
    ];

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Op> {
        Self::ALL.iter().copied().find(|op| op.code() == code)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Noop   => "NOOP",
            Op::Dup    => "DUP",
            Op::Pop    => "POP",
            Op::Swap   => "SWAP",
            Op::Plus   => "PLUS",
            Op::Neg    => "NEG",
            Op::Abs    => "ABS",
            Op::Add    => "ADD",
            Op::Sub    => "SUB",
            Op::Mul    => "MUL",
            Op::Div    => "DIV",
            Op::Rem    => "REM",
            Op::Shl    => "SHL",
            Op::Shr    => "SHR",
            Op::BAnd   => "BAND",
            Op::BOr    => "BOR",
            Op::BXor   => "BXOR",
            Op::BNot   => "BNOT",
            Op::LAnd   => "LAND",
            Op::LOr    => "LOR",
            Op::LXor   => "LXOR",
            Op::LNot   => "LNOT",
            Op::Lt     => "LT",
            Op::Gt     => "GT",
            Op::Le     => "LE",
            Op::Ge     => "GE",
            Op::Eq     => "EQ",
            Op::Neq    => "NEQ",
            Op::Same   => "SAME",
            Op::NSame  => "NSAME",
            Op::LdNull => "LDNULL",
            Op::Ldc    => "LDC",
            Op::Ldv    => "LDV",
            Op::Cast   => "CAST",
            Op::Conv   => "CONV",
            Op::Cond   => "COND",
            Op::Call   => "CALL",
        }
    }

    /// Number of inline operand words following the opcode.
    pub fn operands(self) -> usize {
        match self {
            Op::Ldc | Op::Ldv | Op::Cast | Op::Conv => 1,
            Op::Call => 2,
            _ => 0,
        }
    }
}

// ─── Decoded instructions ────────────────────────────────────────────────────

/// One instruction with its operands resolved against the pools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instr<'a> {
    /// Any instruction without operands.
    Simple(Op),
    LoadConst(&'a Value),
    LoadVar(&'a str),
    Cast(Type),
    Conv(Type),
    Call { name: &'a str, argc: u32 },
}

/// Iterator over the instructions of an [`Expr`]. Stops after the first
/// malformed instruction.
pub struct Decoder<'a> {
    expr: &'a Expr,
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn operand(&mut self, op: Op) -> Result<u32, EvalError> {
        let word = self.expr.ops.get(self.pos).copied().ok_or(EvalError::MissingOperand(op.mnemonic()))?;
        self.pos += 1;
        Ok(word)
    }

    fn constant(&mut self, op: Op) -> Result<&'a Value, EvalError> {
        let index = self.operand(op)?;
        self.expr.consts.get(index as usize).ok_or(EvalError::BadIndex { kind: "constant", index })
    }

    fn name(&mut self, op: Op) -> Result<&'a str, EvalError> {
        let index = self.operand(op)?;
        self.expr.names.get(index as usize).map(String::as_str).ok_or(EvalError::BadIndex { kind: "name", index })
    }

    fn ty(&mut self, op: Op) -> Result<Type, EvalError> {
        let id = self.operand(op)?;
        Type::from_id(id).ok_or(EvalError::UnknownType(id))
    }

    fn decode(&mut self) -> Result<Instr<'a>, EvalError> {
        let code = self.expr.ops[self.pos];
        self.pos += 1;
        let op = Op::from_code(code).ok_or(EvalError::InvalidOpcode(code))?;
        Ok(match op {
            Op::Ldc  => Instr::LoadConst(self.constant(op)?),
            Op::Ldv  => Instr::LoadVar(self.name(op)?),
            Op::Cast => Instr::Cast(self.ty(op)?),
            Op::Conv => Instr::Conv(self.ty(op)?),
            Op::Call => {
                let name = self.name(op)?;
                let argc = self.operand(op)?;
                Instr::Call { name, argc }
            }
            _ => Instr::Simple(op),
        })
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<Instr<'a>, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.expr.ops.len() {
            return None;
        }
        let item = self.decode();
        if item.is_err() {
            self.pos = self.expr.ops.len();
        }
        Some(item)
    }
}

// ─── Expr ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr {
    ops: Arc<[u32]>,
    consts: Arc<[Value]>,
    names: Arc<[String]>,
}

impl Expr {
    pub fn const_null() -> Expr {
        ExprBuilder::new().load_null().build()
    }

    pub fn constant(value: impl Into<Value>) -> Expr {
        ExprBuilder::new().load_const(value.into()).build()
    }

    /// A lone variable reference.
    pub fn name(name: &str) -> Expr {
        ExprBuilder::new().load_var(name).build()
    }

    pub fn instructions(&self) -> &[u32] { &self.ops }
    pub fn constants(&self) -> &[Value] { &self.consts }
    pub fn names(&self) -> &[String] { &self.names }

    pub fn decode(&self) -> Decoder<'_> {
        Decoder { expr: self, pos: 0 }
    }

    /// This expression followed by a best-effort conversion to `ty`.
    pub fn then_convert_to(&self, ty: Type) -> Expr {
        let mut b = ExprBuilder::with_capacity(self.ops.len() + 2);
        b.append(self).convert(ty);
        b.build()
    }

    /// The value this expression always produces, if it is a single constant
    /// load.
    pub fn as_constant(&self) -> Option<Value> {
        match self.ops.as_ref() {
            [code] if *code == Op::LdNull.code() => Some(Value::Null),
            [code, index] if *code == Op::Ldc.code() => self.consts.get(*index as usize).cloned(),
            _ => None,
        }
    }

    /// Human-readable disassembly, one instruction per call to `emit`.
    pub fn write_debug(&self, mut emit: impl FnMut(&str)) {
        for instr in self.decode() {
            let line = match instr {
                Ok(Instr::Simple(op))           => op.mnemonic().to_string(),
                Ok(Instr::LoadConst(v))         => format!("LDC {}", v.string()),
                Ok(Instr::LoadVar(name))        => format!("LDV ${name}"),
                Ok(Instr::Cast(ty))             => format!("CAST {ty}"),
                Ok(Instr::Conv(ty))             => format!("CONV {ty}"),
                Ok(Instr::Call { name, argc })  => format!("CALL {name}#{argc}"),
                Err(_)                          => "[invalid]".to_string(),
            };
            emit(&line);
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        self.write_debug(|l| lines.push(l.to_string()));
        f.write_str(&lines.join("\n"))
    }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Incremental [`Expr`] construction with structural interning of constants
/// and names.
#[derive(Debug, Default, Clone)]
pub struct ExprBuilder {
    ops: Vec<u32>,
    consts: Vec<Value>,
    const_index: FxHashMap<Value, u32>,
    names: Vec<String>,
    name_index: FxHashMap<String, u32>,
}

impl ExprBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn with_capacity(ops: usize) -> Self {
        Self { ops: Vec::with_capacity(ops), ..Self::default() }
    }

    pub fn len(&self) -> usize { self.ops.len() }
    pub fn is_empty(&self) -> bool { self.ops.is_empty() }

    // ── raw emission ─────────────────────────────────────────────────────────

    pub fn opcode(&mut self, op: Op) -> &mut Self {
        self.ops.push(op.code());
        self
    }

    /// Emits an arbitrary word, e.g. an argument count.
    pub fn operand(&mut self, word: u32) -> &mut Self {
        self.ops.push(word);
        self
    }

    /// Interns `value` and emits its pool index.
    pub fn constant(&mut self, value: Value) -> &mut Self {
        let index = self.intern_const(value);
        self.operand(index)
    }

    /// Interns `name` and emits its pool index.
    pub fn name(&mut self, name: &str) -> &mut Self {
        let index = self.intern_name(name);
        self.operand(index)
    }

    pub fn ty(&mut self, ty: Type) -> &mut Self {
        self.operand(ty.id())
    }

    fn intern_const(&mut self, value: Value) -> u32 {
        if let Some(&i) = self.const_index.get(&value) {
            return i;
        }
        let i = self.consts.len() as u32;
        self.consts.push(value.clone());
        self.const_index.insert(value, i);
        i
    }

    fn intern_name(&mut self, name: &str) -> u32 {
        if let Some(&i) = self.name_index.get(name) {
            return i;
        }
        let i = self.names.len() as u32;
        self.names.push(name.to_string());
        self.name_index.insert(name.to_string(), i);
        i
    }

    // ── instructions ─────────────────────────────────────────────────────────

    pub fn load_null(&mut self) -> &mut Self {
        self.opcode(Op::LdNull)
    }

    pub fn load_const(&mut self, value: Value) -> &mut Self {
        self.opcode(Op::Ldc).constant(value)
    }

    pub fn load_var(&mut self, name: &str) -> &mut Self {
        self.opcode(Op::Ldv).name(name)
    }

    pub fn cast(&mut self, ty: Type) -> &mut Self {
        self.opcode(Op::Cast).ty(ty)
    }

    pub fn convert(&mut self, ty: Type) -> &mut Self {
        self.opcode(Op::Conv).ty(ty)
    }

    pub fn call(&mut self, name: &str, argc: u32) -> &mut Self {
        self.opcode(Op::Call).name(name).operand(argc)
    }

    /// Appends another expression's instructions, re-interning its constants
    /// and names into this builder's pools. Undecodable trailing words are
    /// copied verbatim so evaluation still reports them.
    pub fn append(&mut self, expr: &Expr) -> &mut Self {
        let mut decoder = expr.decode();
        loop {
            let start = decoder.pos;
            match decoder.next() {
                None => break,
                Some(Ok(instr)) => { self.instr(instr); }
                Some(Err(_)) => {
                    self.ops.extend_from_slice(&expr.ops[start..]);
                    break;
                }
            }
        }
        self
    }

    pub fn append_builder(&mut self, other: &ExprBuilder) -> &mut Self {
        self.append(&other.build())
    }

    fn instr(&mut self, instr: Instr<'_>) -> &mut Self {
        match instr {
            Instr::Simple(op)          => self.opcode(op),
            Instr::LoadConst(v)        => self.load_const(v.clone()),
            Instr::LoadVar(name)       => self.load_var(name),
            Instr::Cast(ty)            => self.cast(ty),
            Instr::Conv(ty)            => self.convert(ty),
            Instr::Call { name, argc } => self.call(name, argc),
        }
    }

    pub fn build(&self) -> Expr {
        Expr {
            ops: self.ops.as_slice().into(),
            consts: self.consts.as_slice().into(),
            names: self.names.as_slice().into(),
        }
    }

    pub fn reset(&mut self) {
        self.ops.clear();
        self.consts.clear();
        self.const_index.clear();
        self.names.clear();
        self.name_index.clear();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn listing(expr: &Expr) -> Vec<String> {
        let mut out = Vec::new();
        expr.write_debug(|l| out.push(l.to_string()));
        out
    }

    #[test]
    fn opcodes_round_trip() {
        for op in Op::ALL {
            assert_eq!(Op::from_code(op.code()), Some(op));
        }
        assert_eq!(Op::from_code(0x90), None);
        assert_eq!(Op::Call.code(), 0x80);
        assert_eq!(Op::NSame.code(), 0x47);
    }

    #[test]
    fn interns_constants_and_names() {
        let mut b = ExprBuilder::new();
        b.load_const(Value::Int(1)).load_const(Value::Int(1)).opcode(Op::Add);
        b.load_var("x").load_var("x").opcode(Op::Mul);
        let e = b.build();
        assert_eq!(e.constants(), &[Value::Int(1)]);
        assert_eq!(e.names(), &["x".to_string()]);
        assert_eq!(e.instructions(), &[0x51, 0, 0x51, 0, 0x13, 0x52, 0, 0x52, 0, 0x15]);
    }

    #[test]
    fn append_reinterns() {
        let mut lhs = ExprBuilder::new();
        lhs.load_const(Value::from("a")).load_var("y");
        let lhs = lhs.build();
        let mut rhs = ExprBuilder::new();
        rhs.load_var("x").load_const(Value::from("b")).load_var("y");
        let rhs = rhs.build();

        let mut b = ExprBuilder::new();
        b.append(&lhs).append(&rhs);
        let e = b.build();
        assert_eq!(e.constants(), &[Value::from("a"), Value::from("b")]);
        assert_eq!(e.names(), &["y".to_string(), "x".to_string()]);
        assert_eq!(listing(&e), vec!["LDC a", "LDV $y", "LDV $x", "LDC b", "LDV $y"]);
    }

    #[test]
    fn debug_listing() {
        let mut b = ExprBuilder::new();
        b.load_const(Value::Int(2)).load_var("n").call("max", 2).cast(Type::Int).convert(Type::Str);
        assert_eq!(listing(&b.build()), vec!["LDC 2", "LDV $n", "CALL max#2", "CAST int", "CONV str"]);
    }

    #[test]
    fn malformed_listing() {
        let mut b = ExprBuilder::new();
        b.opcode(Op::Dup).operand(0xEE).opcode(Op::Dup);
        assert_eq!(listing(&b.build()), vec!["DUP", "[invalid]"]);

        let mut b = ExprBuilder::new();
        b.opcode(Op::Ldc);
        assert_eq!(b.build().decode().next(), Some(Err(EvalError::MissingOperand("LDC"))));
    }

    #[test]
    fn append_keeps_malformed_tail() {
        let mut bad = ExprBuilder::new();
        bad.load_null().operand(0xEE);
        let mut b = ExprBuilder::new();
        b.append(&bad.build());
        assert_eq!(b.build().instructions(), &[0x50, 0xEE]);
    }

    #[test]
    fn then_convert_to() {
        let e = Expr::name("w").then_convert_to(Type::Length);
        assert_eq!(listing(&e), vec!["LDV $w", "CONV len"]);
    }

    #[test]
    fn constant_shortcuts() {
        assert_eq!(Expr::const_null().as_constant(), Some(Value::Null));
        assert_eq!(Expr::constant(3i64).as_constant(), Some(Value::Int(3)));
        assert_eq!(Expr::name("x").as_constant(), None);
    }

    #[test]
    fn reset_clears_pools() {
        let mut b = ExprBuilder::new();
        b.load_const(Value::Int(9));
        b.reset();
        b.load_const(Value::Int(1));
        assert_eq!(b.build().constants(), &[Value::Int(1)]);
    }
}
