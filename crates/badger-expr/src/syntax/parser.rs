use crate::error::{ErrorCode, SyntaxError};
use crate::syntax::ast::*;
use crate::syntax::token::{Token, TokenKind};
use crate::types::Type;

type Level = fn(&mut Parser) -> Result<Expr, SyntaxError>;

/// Deepest run of parenthesised, bracketed or prefixed sub-expressions.
pub const MAX_NESTING: usize = 64;

/// Upper bound on tree nodes in one expression, which also bounds tree height.
pub const MAX_NODES: usize = 4096;

/// Magnitude of `i64::MIN`, only valid directly after a unary minus.
const MIN_INT_MAGNITUDE: u64 = 1 << 63;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    nodes: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0, depth: 0, nodes: 0 }
    }

    /// Parses exactly one expression spanning the whole input.
    pub fn parse(mut self) -> Result<Expr, SyntaxError> {
        let expr = self.parse_expr()?;
        if !self.is_at_end() {
            let tok = self.peek();
            return Err(SyntaxError::new(ErrorCode::P003, tok.line, tok.column,
                format!("unexpected {} after expression", tok.kind.describe())));
        }
        Ok(expr)
    }

    // ─── Expressions (precedence climbing) ───────────────────────────────────

    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.nested(|p| if p.check(TokenKind::If) { p.parse_if() } else { p.parse_ternary() })
    }

    /// `if c then a else b`
    fn parse_if(&mut self) -> Result<Expr, SyntaxError> {
        let span = self.span();
        self.advance();
        let cond = self.parse_expr()?;
        self.expect(TokenKind::Then)?;
        let yes = self.parse_expr()?;
        self.expect(TokenKind::Else)?;
        let no = self.parse_expr()?;
        self.node(Expr::Cond { cond: Box::new(cond), yes: Box::new(yes), no: Box::new(no), span })
    }

    /// `c ? a : b`, right-associative in both branches.
    fn parse_ternary(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.parse_or()?;
        if self.matches(TokenKind::Question) {
            let span = expr.span();
            let yes = self.parse_expr()?;
            self.expect(TokenKind::Colon)?;
            let no = self.parse_expr()?;
            return self.node(Expr::Cond { cond: Box::new(expr), yes: Box::new(yes), no: Box::new(no), span });
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        self.fold_binary(Self::parse_xor, |k| match k {
            TokenKind::PipePipe | TokenKind::Or => Some(BinOp::Or),
            _ => None,
        })
    }

    fn parse_xor(&mut self) -> Result<Expr, SyntaxError> {
        self.fold_binary(Self::parse_and, |k| match k {
            TokenKind::CaretCaret | TokenKind::Xor => Some(BinOp::Xor),
            _ => None,
        })
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        self.fold_binary(Self::parse_bit_or, |k| match k {
            TokenKind::AmpAmp | TokenKind::And => Some(BinOp::And),
            _ => None,
        })
    }

    fn parse_bit_or(&mut self) -> Result<Expr, SyntaxError> {
        self.fold_binary(Self::parse_bit_xor, |k| match k {
            TokenKind::Pipe => Some(BinOp::BitOr),
            _ => None,
        })
    }

    fn parse_bit_xor(&mut self) -> Result<Expr, SyntaxError> {
        self.fold_binary(Self::parse_bit_and, |k| match k {
            TokenKind::Caret => Some(BinOp::BitXor),
            _ => None,
        })
    }

    fn parse_bit_and(&mut self) -> Result<Expr, SyntaxError> {
        self.fold_binary(Self::parse_equality, |k| match k {
            TokenKind::Amp => Some(BinOp::BitAnd),
            _ => None,
        })
    }

    fn parse_equality(&mut self) -> Result<Expr, SyntaxError> {
        self.fold_binary(Self::parse_comparison, |k| match k {
            TokenKind::EqEq     => Some(BinOp::Eq),
            TokenKind::BangEq   => Some(BinOp::NotEq),
            TokenKind::EqEqEq   => Some(BinOp::Same),
            TokenKind::BangEqEq => Some(BinOp::NotSame),
            _ => None,
        })
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        self.fold_binary(Self::parse_shift, |k| match k {
            TokenKind::Lt   => Some(BinOp::Lt),
            TokenKind::LtEq => Some(BinOp::LtEq),
            TokenKind::Gt   => Some(BinOp::Gt),
            TokenKind::GtEq => Some(BinOp::GtEq),
            _ => None,
        })
    }

    fn parse_shift(&mut self) -> Result<Expr, SyntaxError> {
        self.fold_binary(Self::parse_addition, |k| match k {
            TokenKind::LtLt => Some(BinOp::Shl),
            TokenKind::GtGt => Some(BinOp::Shr),
            _ => None,
        })
    }

    fn parse_addition(&mut self) -> Result<Expr, SyntaxError> {
        self.fold_binary(Self::parse_multiplication, |k| match k {
            TokenKind::Plus  => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    fn parse_multiplication(&mut self) -> Result<Expr, SyntaxError> {
        self.fold_binary(Self::parse_unary, |k| match k {
            TokenKind::Star    => Some(BinOp::Mul),
            TokenKind::Slash   => Some(BinOp::Div),
            TokenKind::Percent => Some(BinOp::Rem),
            _ => None,
        })
    }

    /// Left-associative run of one precedence level.
    fn fold_binary(&mut self, next: Level, op_for: fn(&TokenKind) -> Option<BinOp>) -> Result<Expr, SyntaxError> {
        let mut left = next(self)?;
        while let Some(op) = op_for(&self.peek().kind) {
            let span = left.span();
            self.advance();
            let right = next(self)?;
            left = self.node(Expr::Binary { left: Box::new(left), op, right: Box::new(right), span })?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let span = self.span();
        let op = match self.peek().kind {
            TokenKind::Plus  => UnOp::Plus,
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Bang | TokenKind::Not => UnOp::Not,
            TokenKind::Tilde => UnOp::BitNot,
            _ => return self.parse_postfix(),
        };
        self.advance();
        // `-9223372036854775808` folds to a single literal, since its
        // magnitude alone does not fit in an int.
        if op == UnOp::Neg && matches!(self.peek().kind, TokenKind::Int(MIN_INT_MAGNITUDE)) {
            self.advance();
            let min = self.node(Expr::Literal(Literal::Int(i64::MIN), span))?;
            return self.parse_conversions(min);
        }
        let operand = self.nested(Self::parse_unary)?;
        self.node(Expr::Unary { op, operand: Box::new(operand), span })
    }

    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.parse_primary()?;
        self.parse_conversions(expr)
    }

    /// `expr as type`, repeatable.
    fn parse_conversions(&mut self, mut expr: Expr) -> Result<Expr, SyntaxError> {
        while self.matches(TokenKind::As) {
            let span = expr.span();
            let ty = self.parse_type()?;
            expr = self.node(Expr::Convert { expr: Box::new(expr), ty, span })?;
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let tok = self.peek().clone();
        let span = Span::new(tok.line, tok.column);

        let literal = match tok.kind {
            TokenKind::Null            => Literal::Null,
            TokenKind::Bool(v)         => Literal::Bool(v),
            TokenKind::Nan             => Literal::Float(f64::NAN),
            TokenKind::Inf             => Literal::Float(f64::INFINITY),
            TokenKind::Int(v)          => Literal::Int(i64::try_from(v).map_err(|_| {
                SyntaxError::new(ErrorCode::L004, span.line, span.column, format!("integer literal {v} is out of range"))
            })?),
            TokenKind::Float(v)        => Literal::Float(v),
            TokenKind::Dimension(v, u) => Literal::Dimension(v, u),
            TokenKind::Str(s)          => Literal::Str(s),
            TokenKind::HexColor(s)     => Literal::Color(s),

            TokenKind::Var(name) => {
                self.advance();
                return self.node(Expr::Var(name, span));
            }

            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                return Ok(expr);
            }

            // `|x|`. The inner expression binds tighter than `|`, so a bitwise
            // or inside needs parentheses.
            TokenKind::Pipe => {
                self.advance();
                let operand = self.nested(Self::parse_bit_xor)?;
                self.expect(TokenKind::Pipe)?;
                return self.node(Expr::Unary { op: UnOp::Abs, operand: Box::new(operand), span });
            }

            TokenKind::Ident(_) => return self.parse_call(),

            _ => return Err(self.unexpected("expression")),
        };
        self.advance();
        self.node(Expr::Literal(literal, span))
    }

    fn parse_call(&mut self) -> Result<Expr, SyntaxError> {
        let tok = self.advance();
        let span = Span::new(tok.line, tok.column);
        let TokenKind::Ident(callee) = tok.kind else {
            return Err(self.error_at(&tok, "expected function name"));
        };
        if !self.check(TokenKind::LParen) {
            let tok = self.peek();
            return Err(SyntaxError::new(ErrorCode::P002, tok.line, tok.column,
                format!("expected `(` after `{callee}`, variables are written `${callee}`")));
        }
        self.advance();
        let args = self.parse_arg_list()?;
        self.expect(TokenKind::RParen)?;
        self.node(Expr::Call { callee, args, span })
    }

    // ─── Argument lists ──────────────────────────────────────────────────────

    fn parse_arg_list(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            args.push(self.parse_expr()?);
            if !self.matches(TokenKind::Comma) { break; }
        }
        Ok(args)
    }

    // ─── Types ───────────────────────────────────────────────────────────────

    fn parse_type(&mut self) -> Result<Type, SyntaxError> {
        let tok = self.advance();
        let ty = match &tok.kind {
            TokenKind::Null => Some(Type::Null),
            TokenKind::Ident(name) => Type::from_name(name),
            _ => None,
        };
        ty.ok_or_else(|| SyntaxError::new(ErrorCode::P001, tok.line, tok.column,
            format!("expected type name, found {}", tok.kind.describe())))
    }

    // ─── Limits ──────────────────────────────────────────────────────────────

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, SyntaxError>) -> Result<T, SyntaxError> {
        if self.depth >= MAX_NESTING {
            let tok = self.peek();
            return Err(SyntaxError::new(ErrorCode::P004, tok.line, tok.column, "Expression nested too deeply"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn node(&mut self, expr: Expr) -> Result<Expr, SyntaxError> {
        self.nodes += 1;
        if self.nodes > MAX_NODES {
            let span = expr.span();
            return Err(SyntaxError::new(ErrorCode::P005, span.line, span.column,
                format!("Expression too large, more than {MAX_NODES} terms")));
        }
        Ok(expr)
    }

    // ─── Token primitives ────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() { self.pos += 1; }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) { self.advance(); true } else { false }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            Err(SyntaxError::new(
                ErrorCode::P002,
                tok.line,
                tok.column,
                format!("expected {}, found {}", kind.describe(), tok.kind.describe()),
            ))
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn span(&self) -> Span {
        let tok = self.peek();
        Span::new(tok.line, tok.column)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let tok = self.peek();
        SyntaxError::new(
            ErrorCode::P001,
            tok.line,
            tok.column,
            format!("expected {}, found {}", expected, tok.kind.describe()),
        )
    }

    fn error_at(&self, tok: &Token, msg: &str) -> SyntaxError {
        SyntaxError::new(ErrorCode::P001, tok.line, tok.column, msg)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
