use thiserror::Error;

use crate::types::Type;

/// Syntax error codes prefixed by phase: L = lexer, P = parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lexer
    L001, // unexpected character
    L002, // unterminated string literal
    L003, // invalid escape sequence
    L004, // malformed number
    L005, // malformed color
    L006, // invalid unit

    // Parser
    P001, // unexpected token
    P002, // missing expected token
    P003, // trailing input after expression
    P004, // expression nested too deeply
    P005, // too many call arguments
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::L002 => "L002",
            Self::L003 => "L003",
            Self::L004 => "L004",
            Self::L005 => "L005",
            Self::L006 => "L006",
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::P003 => "P003",
            Self::P004 => "P004",
            Self::P005 => "P005",
        }
    }
}

/// Malformed expression text. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct SyntaxError {
    pub code: ErrorCode,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(code: ErrorCode, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self { code, line, column, message: message.into() }
    }
}

// ─────────────────────────────────────────────────────────────────────────────

fn quoted(types: &[Type]) -> String {
    types.iter().map(|t| format!("'{t}'")).collect::<Vec<_>>().join(", ")
}

/// Failure while running a compiled expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Unbound variable ${0}")]
    UnboundVariable(String),

    #[error("Operator '{op}' is not applicable to {}", quoted(.operands))]
    NotApplicable { op: &'static str, operands: Vec<Type> },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Can't cast {from} to {to}")]
    BadCast { from: Type, to: Type },

    #[error("Can't convert {from} to {to}")]
    BadConversion { from: Type, to: Type },

    #[error("Unknown type id {0}")]
    UnknownType(u32),

    #[error("Unknown function name '{0}'")]
    UnknownFunction(String),

    #[error("Function '{name}' expects {expected} arguments, got {got}")]
    Arity { name: String, expected: usize, got: usize },

    #[error("Function '{name}' is not applicable to {}", quoted(.operands))]
    FunctionNotApplicable { name: String, operands: Vec<Type> },

    #[error("Function '{name}' failed: {message}")]
    Function { name: String, message: String },

    #[error("Invalid opcode 0x{0:02X}")]
    InvalidOpcode(u32),

    #[error("Instruction {0} is missing its operand")]
    MissingOperand(&'static str),

    #[error("Invalid {kind} index {index}")]
    BadIndex { kind: &'static str, index: u32 },

    #[error("Stack underflow")]
    StackUnderflow,

    #[error("Expression incomplete, stack should end with one value")]
    Incomplete,

    #[error("Variable resolution exceeded the depth limit of {0}")]
    TooDeep(usize),
}

/// Any failure surfaced by the expression core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("Variable '{0}' is dependent on itself")]
    SelfDependency(String),

    #[error("Can't convert {from} to {to}")]
    Conversion { from: Type, to: Type },
}
