//! Expression text → [`Expr`].

pub mod ast;
pub mod codegen;
pub mod lexer;
pub mod parser;
pub mod token;

use tracing::debug;

use crate::error::{ErrorCode, SyntaxError};
use crate::runtime::expr::Expr;

/// Parses and compiles one expression. Lexer errors beyond the first are
/// dropped.
pub fn parse_expr(text: &str) -> Result<Expr, SyntaxError> {
    let tokens = lexer::Lexer::new(text).tokenize().map_err(first_error)?;
    let tree = parser::Parser::new(tokens).parse()?;
    let expr = codegen::generate(&tree)?;
    debug!(text, instructions = expr.instructions().len(), "parsed expression");
    Ok(expr)
}

fn first_error(errors: Vec<SyntaxError>) -> SyntaxError {
    errors.into_iter().next()
        .unwrap_or_else(|| SyntaxError::new(ErrorCode::L001, 1, 1, "invalid expression"))
}
