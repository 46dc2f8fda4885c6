//! Parse tree → [`Expr`] instruction stream.
//!
//! Literals are folded into constants here, so unit suffixes and color digits
//! are validated at this stage and reported as syntax errors.

use std::f64::consts::PI;

use crate::error::{ErrorCode, SyntaxError};
use crate::runtime::expr::{Expr, ExprBuilder, Op};
use crate::runtime::value::Value;
use crate::syntax::ast::{self, BinOp, Literal, Span, UnOp};
use crate::types::color::Color;
use crate::types::length::Length;

pub fn generate(tree: &ast::Expr) -> Result<Expr, SyntaxError> {
    let mut b = ExprBuilder::new();
    emit(&mut b, tree)?;
    Ok(b.build())
}

fn emit(b: &mut ExprBuilder, e: &ast::Expr) -> Result<(), SyntaxError> {
    match e {
        ast::Expr::Literal(Literal::Null, _) => { b.load_null(); }
        ast::Expr::Literal(lit, span) => { b.load_const(literal(lit, *span)?); }
        ast::Expr::Var(name, _) => { b.load_var(name); }

        ast::Expr::Unary { op, operand, .. } => {
            emit(b, operand)?;
            b.opcode(unary_opcode(*op));
        }
        ast::Expr::Binary { left, op, right, .. } => {
            emit(b, left)?;
            emit(b, right)?;
            b.opcode(binary_opcode(*op));
        }
        ast::Expr::Cond { cond, yes, no, .. } => {
            emit(b, cond)?;
            emit(b, yes)?;
            emit(b, no)?;
            b.opcode(Op::Cond);
        }
        ast::Expr::Convert { expr, ty, .. } => {
            emit(b, expr)?;
            b.convert(*ty);
        }
        ast::Expr::Call { callee, args, span } => {
            let argc = arg_count(args.len(), callee, *span)?;
            // Reversed, so the machine pops them in source order.
            for arg in args.iter().rev() {
                emit(b, arg)?;
            }
            b.call(callee, argc);
        }
    }
    Ok(())
}

fn arg_count(n: usize, callee: &str, span: Span) -> Result<u32, SyntaxError> {
    u32::try_from(n).map_err(|_| {
        SyntaxError::new(ErrorCode::P005, span.line, span.column, format!("Too many arguments to {callee}()"))
    })
}

fn unary_opcode(op: UnOp) -> Op {
    match op {
        UnOp::Plus   => Op::Plus,
        UnOp::Neg    => Op::Neg,
        UnOp::Abs    => Op::Abs,
        UnOp::Not    => Op::LNot,
        UnOp::BitNot => Op::BNot,
    }
}

fn binary_opcode(op: BinOp) -> Op {
    match op {
        BinOp::Add     => Op::Add,
        BinOp::Sub     => Op::Sub,
        BinOp::Mul     => Op::Mul,
        BinOp::Div     => Op::Div,
        BinOp::Rem     => Op::Rem,
        BinOp::Shl     => Op::Shl,
        BinOp::Shr     => Op::Shr,
        BinOp::BitAnd  => Op::BAnd,
        BinOp::BitOr   => Op::BOr,
        BinOp::BitXor  => Op::BXor,
        BinOp::And     => Op::LAnd,
        BinOp::Or      => Op::LOr,
        BinOp::Xor     => Op::LXor,
        BinOp::Eq      => Op::Eq,
        BinOp::NotEq   => Op::Neq,
        BinOp::Same    => Op::Same,
        BinOp::NotSame => Op::NSame,
        BinOp::Lt      => Op::Lt,
        BinOp::LtEq    => Op::Le,
        BinOp::Gt      => Op::Gt,
        BinOp::GtEq    => Op::Ge,
    }
}

// ─── Literals ────────────────────────────────────────────────────────────────

fn literal(lit: &Literal, span: Span) -> Result<Value, SyntaxError> {
    Ok(match lit {
        Literal::Null            => Value::Null,
        Literal::Bool(v)         => Value::Bool(*v),
        Literal::Int(v)          => Value::Int(*v),
        Literal::Float(v)        => Value::Float(*v),
        Literal::Str(s)          => Value::Str(s.clone()),
        Literal::Dimension(v, u) => dimension(*v, u).ok_or_else(|| {
            SyntaxError::new(ErrorCode::L006, span.line, span.column, format!("Invalid unit '{u}'"))
        })?,
        Literal::Color(digits) => {
            let text = format!("#{digits}");
            let color = Color::from_hex(&text).ok_or_else(|| {
                SyntaxError::new(ErrorCode::L005, span.line, span.column, format!("Malformed color '{text}'"))
            })?;
            Value::Color(color)
        }
    })
}

/// Pre-converts a unit number into a length or angle constant.
pub fn dimension(num: f64, unit: &str) -> Option<Value> {
    let len = match unit {
        "px"                 => Length::pixels(num),
        "in"                 => Length::inches(num),
        "ft"                 => Length::feet(num),
        "yd"                 => Length::yards(num),
        "mm"                 => Length::millimetres(num),
        "cm"                 => Length::centimetres(num),
        "m"                  => Length::metres(num),
        "pt"                 => Length::points(num),
        "pc"                 => Length::pica(num),
        "%" | "par" | "par%" => Length::parent_perc(num),
        "self" | "self%"     => Length::self_perc(num),
        "deg"                => return Some(Value::Angle(num / 180.0 * PI)),
        "rad"                => return Some(Value::Angle(num)),
        _                    => return None,
    };
    Some(Value::Length(len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_expr;
    use pretty_assertions::assert_eq;

    fn listing(src: &str) -> Vec<String> {
        let mut out = Vec::new();
        parse_expr(src).expect("parse failed").write_debug(|l| out.push(l.to_string()));
        out
    }

    #[test]
    fn binary_emits_operands_then_opcode() {
        assert_eq!(listing("1 + $x * 2"), vec!["LDC 1", "LDV $x", "LDC 2", "MUL", "ADD"]);
    }

    #[test]
    fn call_arguments_are_reversed() {
        assert_eq!(listing("max(1, 2, 3)"), vec!["LDC 3", "LDC 2", "LDC 1", "CALL max#3"]);
    }

    #[test]
    fn argument_count_must_fit_the_operand() {
        assert_eq!(arg_count(3, "max", Span::new(1, 1)), Ok(3));
        if let Ok(n) = usize::try_from(u64::from(u32::MAX) + 1) {
            let err = arg_count(n, "max", Span::new(2, 7)).unwrap_err();
            assert_eq!(err.code, ErrorCode::P005);
            assert_eq!(err.to_string(), "2:7: Too many arguments to max()");
        }
    }

    #[test]
    fn conditional() {
        assert_eq!(listing("$a ? 'y' : null"), vec!["LDV $a", "LDC y", "LDNULL", "COND"]);
    }

    #[test]
    fn conversion_and_unary() {
        assert_eq!(listing("-$x as int"), vec!["LDV $x", "CONV int", "NEG"]);
        assert_eq!(listing("!~|$x|"), vec!["LDV $x", "ABS", "BNOT", "LNOT"]);
    }

    #[test]
    fn units_are_folded() {
        let e = parse_expr("10deg").unwrap();
        assert_eq!(e.as_constant(), Some(Value::Angle(10.0 / 180.0 * PI)));
        let e = parse_expr("2in").unwrap();
        assert_eq!(e.as_constant(), Some(Value::Length(Length::inches(2.0))));
        let e = parse_expr("50%").unwrap();
        assert_eq!(e.as_constant(), Some(Value::Length(Length::parent_perc(50.0))));
    }

    #[test]
    fn invalid_unit() {
        let err = parse_expr("5furlongs").unwrap_err();
        assert_eq!(err.code, ErrorCode::L006);
        assert_eq!(err.to_string(), "1:1: Invalid unit 'furlongs'");
    }

    #[test]
    fn malformed_color() {
        assert_eq!(parse_expr("#12345").unwrap_err().code, ErrorCode::L005);
        assert_eq!(parse_expr("#ggg").unwrap_err().code, ErrorCode::L005);
        assert_eq!(parse_expr("#f00").unwrap().as_constant(), Some(Value::Color(Color::rgb(255, 0, 0))));
    }

    #[test]
    fn interning_dedups_repeats() {
        let e = parse_expr("$x + $x + 1 + 1").unwrap();
        assert_eq!(e.names().len(), 1);
        assert_eq!(e.constants(), &[Value::Int(1)]);
    }
}
