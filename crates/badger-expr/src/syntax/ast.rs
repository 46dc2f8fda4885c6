use crate::types::Type;

/// Source location attached to every node for error reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

// ─── Expressions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal, Span),

    /// `$name`
    Var(String, Span),

    /// `-x`, `!x`, `|x|`
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        span: Span,
    },

    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
        span: Span,
    },

    /// `c ? a : b` or `if c then a else b`
    Cond {
        cond: Box<Expr>,
        yes: Box<Expr>,
        no: Box<Expr>,
        span: Span,
    },

    /// `x as int`
    Convert {
        expr: Box<Expr>,
        ty: Type,
        span: Span,
    },

    /// `name(args)`
    Call {
        callee: String,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(_, s)        => *s,
            Expr::Var(_, s)            => *s,
            Expr::Unary { span, .. }   => *span,
            Expr::Binary { span, .. }  => *span,
            Expr::Cond { span, .. }    => *span,
            Expr::Convert { span, .. } => *span,
            Expr::Call { span, .. }    => *span,
        }
    }
}

/// Literal as written. Units and colors are validated when generating code.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Number with a unit suffix: `5px`, `10deg`, `50%`.
    Dimension(f64, String),
    Str(String),
    /// Hex digits without `#`.
    Color(String),
}

// ─── Operators ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add, Sub, Mul, Div, Rem,
    Shl, Shr,
    BitAnd, BitOr, BitXor,
    And, Or, Xor,
    Eq, NotEq, Same, NotSame,
    Lt, LtEq, Gt, GtEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    Plus,
    Neg,
    Abs,
    Not,
    BitNot,
}
