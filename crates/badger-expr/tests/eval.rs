//! Expression evaluation tests.
//!
//! Tests the full stack: parse_expr → Expr → eval. Variables come from a
//! plain closure here; scope resolution has its own test file.

use std::f64::consts::PI;

use badger_expr::{Color, Error, ErrorCode, EvalError, FunctionRegistry, Length, Metrics, Resolver, Type, Value, parse_expr};
use badger_expr::{EmptyScope, FnEvaluator, ParamType, QueryParam, RawDyn, bind_params};
use badger_expr::types::BinaryOp;
use pretty_assertions::assert_eq;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn run(src: &str) -> Value {
    let expr = parse_expr(src).unwrap_or_else(|e| panic!("parse failed for {src:?}: {e}"));
    expr.eval_with(|_| None).unwrap_or_else(|e| panic!("eval failed for {src:?}: {e}"))
}

fn run_err(src: &str) -> Error {
    let expr = parse_expr(src).unwrap_or_else(|e| panic!("parse failed for {src:?}: {e}"));
    match expr.eval_with(|_| None) {
        Ok(v)  => panic!("expected {src:?} to fail but it gave {v:?}"),
        Err(e) => e,
    }
}

fn run_fn(src: &str) -> Value {
    let funs = FunctionRegistry::standard();
    let expr = parse_expr(src).unwrap_or_else(|e| panic!("parse failed for {src:?}: {e}"));
    Resolver::new(&EmptyScope).with_functions(&funs).eval(&expr)
        .unwrap_or_else(|e| panic!("eval failed for {src:?}: {e}"))
}

fn s(src: &str) -> String {
    run(src).string()
}

// ─── Rank dispatch ───────────────────────────────────────────────────────────

#[test]
fn float_times_int_uses_float() {
    let v = Value::apply(BinaryOp::Mul, &Value::Float(42.0), &Value::Int(42));
    assert_eq!(v, Some(Value::Float(1764.0)));
    assert_eq!(run("42.0 * 42"), Value::Float(1764.0));
    assert_eq!(run("42 * 42.0"), Value::Float(1764.0));
}

#[test]
fn color_has_no_multiply() {
    let c = Value::Color(Color::rgb(10, 20, 30));
    assert_eq!(Value::apply(BinaryOp::Mul, &c, &Value::Int(42)), None);
    let err = run_err("#0a141e * 42");
    assert_eq!(err.to_string(), "Operator '*' is not applicable to 'col', 'int'");
}

#[test]
fn strings_concatenate_anything() {
    assert_eq!(run("5 + \"a\""), Value::from("5a"));
    assert_eq!(s("'w=' + 2.5px"), "w=2.5px");
    assert_eq!(s("null + ''"), "null");
    assert_eq!(run("|'héllo'|"), Value::Int(5));
    assert_eq!(run("|'🦡 badge'|"), Value::Int(8));
}

#[test]
fn bool_as_number() {
    assert_eq!(run("true + 1"), Value::Int(2));
    assert_eq!(run("true & false"), Value::Bool(false));
}

// ─── Integers ────────────────────────────────────────────────────────────────

#[test]
fn shift_overflow_is_zero() {
    assert_eq!(run("1 << 100"), Value::Int(0));
    assert_eq!(run("1 << -100"), Value::Int(0));
    assert_eq!(run("1 << 4"), Value::Int(16));
    assert_eq!(run("-1 >> 60"), Value::Int(15));
}

#[test]
fn integer_division() {
    assert_eq!(run("7 / 2"), Value::Int(3));
    assert_eq!(run("-7 % 3"), Value::Int(-1));
    assert_eq!(run_err("1 / 0"), Error::Eval(EvalError::DivisionByZero));
    assert_eq!(run("1.0 / 0"), Value::Float(f64::INFINITY));
}

#[test]
fn most_negative_literal() {
    assert_eq!(run("-9223372036854775808"), Value::Int(i64::MIN));
    assert_eq!(s("-9223372036854775808 as str"), "-9223372036854775808");
    assert_eq!(run("-9223372036854775808 < -9223372036854775807"), Value::Bool(true));
    assert_eq!(parse_expr("9223372036854775808").unwrap_err().code, ErrorCode::L004);
}

// ─── Units ───────────────────────────────────────────────────────────────────

#[test]
fn unit_literals_round_trip() {
    let m = Metrics { dpi: 96.0, ..Metrics::default() };
    let px = |src: &str| match run(src) {
        Value::Length(l) => m.pixels(&l),
        other => panic!("expected length from {src:?}, got {other:?}"),
    };
    assert_eq!(px("5px"), 5.0);
    assert_eq!(px("2in"), 192.0);
    assert_eq!(px("1in + 4px"), 100.0);
    assert_eq!(run("10deg"), Value::Angle(10.0 / 180.0 * PI));
    assert_eq!(run("2rad").as_angle(), Some(2.0));
}

#[test]
fn lengths_scale_and_compare() {
    assert_eq!(run("2 * 3px"), Value::Length(Length::pixels(6.0)));
    assert_eq!(run("5px == 5px"), Value::Bool(true));
    assert_eq!(run("5px == 6px"), Value::Bool(false));
    assert!(matches!(run_err("5px < 6px"), Error::Eval(EvalError::NotApplicable { .. })));
    assert!(matches!(run_err("5px * 5px"), Error::Eval(EvalError::NotApplicable { .. })));
}

#[test]
fn angle_ratio() {
    assert_eq!(run("90deg / 45deg"), Value::Float(2.0));
}

// ─── Logic, comparison and conditionals ──────────────────────────────────────

#[test]
fn ternary() {
    assert_eq!(run("5 > 3 ? \"y\" : \"n\""), Value::from("y"));
    assert_eq!(run("if 5 < 3 then 'y' else 'n'"), Value::from("n"));
    assert_eq!(run("false ? 1 : true ? 2 : 3"), Value::Int(2));
}

#[test]
fn logic_yields_bools() {
    assert_eq!(run("1 && 'x'"), Value::Bool(true));
    assert_eq!(run("0 or ''"), Value::Bool(false));
    assert_eq!(run("1 ^^ 1"), Value::Bool(false));
    assert_eq!(run("not null"), Value::Bool(true));
}

#[test]
fn equality_and_sameness() {
    assert_eq!(run("1 == 1.0"), Value::Bool(true));
    assert_eq!(run("1 === 1.0"), Value::Bool(false));
    assert_eq!(run("nan === nan"), Value::Bool(true));
    assert_eq!(run("null == null"), Value::Bool(true));
    assert_eq!(run("'a' < 'b'"), Value::Bool(true));
}

// ─── Conversion ──────────────────────────────────────────────────────────────

#[test]
fn as_converts() {
    assert_eq!(run("'42' as int"), Value::Int(42));
    assert_eq!(run("2.9 as int"), Value::Int(2));
    assert_eq!(run("1 as bool"), Value::Bool(true));
    assert_eq!(run("'#ff0000' as col"), Value::Color(Color::rgb(255, 0, 0)));
    assert_eq!(run("3 as len"), Value::Length(Length::pixels(3.0)));
    assert_eq!(run("2 as float as str"), Value::from("2.0"));
    assert_eq!(
        run_err("5px as int"),
        Error::Eval(EvalError::BadConversion { from: Type::Length, to: Type::Int }),
    );
}

// ─── Functions ───────────────────────────────────────────────────────────────

#[test]
fn standard_functions() {
    assert_eq!(run_fn("max(1, 5, 3)"), Value::Int(5));
    assert_eq!(run_fn("min(2.5, 1)"), Value::Int(1));
    assert_eq!(run_fn("sqrt(16)"), Value::Float(4.0));
    assert_eq!(run_fn("pow(2, 10)"), Value::Float(1024.0));
    assert_eq!(run_fn("round(2.5)"), Value::Float(2.0));
    assert_eq!(run_fn("pi()"), Value::Float(PI));
}

#[test]
fn functions_need_a_registry() {
    assert_eq!(run_err("sqrt(4)"), Error::Eval(EvalError::UnknownFunction("sqrt".into())));
}

#[test]
fn custom_function() {
    let mut funs = FunctionRegistry::new();
    funs.register_fixed("twice", 1, |args: &[Value]| {
        Value::checked_apply(BinaryOp::Mul, &args[0], &Value::Int(2))?
            .ok_or(EvalError::FunctionNotApplicable { name: "twice".into(), operands: vec![args[0].ty()] })
    });
    let expr = parse_expr("twice($x) + 1").unwrap();
    let mut ev = FnEvaluator::new(|n: &str| (n == "x").then_some(Value::Int(20))).with_functions(&funs);
    assert_eq!(expr.eval(&mut ev), Ok(Value::Int(41)));
    let err = parse_expr("twice(1, 2)").unwrap().eval(&mut ev).unwrap_err();
    assert_eq!(err.to_string(), "Function 'twice' expects 1 arguments, got 2");
}

// ─── Syntax errors ───────────────────────────────────────────────────────────

#[test]
fn syntax_errors_carry_codes() {
    let code = |src: &str| parse_expr(src).unwrap_err().code;
    assert_eq!(code("'open"), ErrorCode::L002);
    assert_eq!(code("'\\q'"), ErrorCode::L003);
    assert_eq!(code("99999999999999999999"), ErrorCode::L004);
    assert_eq!(code("#abcde"), ErrorCode::L005);
    assert_eq!(code("3parsecs"), ErrorCode::L006);
    assert_eq!(code("1 +"), ErrorCode::P001);
    assert_eq!(code("width"), ErrorCode::P002);
    assert_eq!(code("1 2"), ErrorCode::P003);
    assert_eq!(code(&"(".repeat(100)), ErrorCode::P004);
    assert_eq!(code(&vec!["$x"; 5_000].join(" * ")), ErrorCode::P005);
}

#[test]
fn deep_nesting_is_a_syntax_error() {
    let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
    let err = parse_expr(&parens).unwrap_err();
    assert_eq!(err.code, ErrorCode::P004);
    assert_eq!(err.to_string(), "1:65: Expression nested too deeply");

    let negations = RawDyn::new(format!("{}1", "-".repeat(200_000)));
    let err = negations.instantiate_as_expr(ParamType::Any).unwrap_err();
    assert_eq!(err.code, ErrorCode::P004);
}

#[test]
fn deep_parameter_value_is_malformed() {
    let decls = [("n", QueryParam::required(ParamType::Any))];
    let deep = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
    let err = bind_params(decls.iter().map(|(n, p)| (*n, p)), |_| Some(deep.clone())).unwrap_err();
    assert_eq!(err.to_string(), "Malformed input parameter 'n'");
}

#[test]
fn moderate_nesting_evaluates() {
    let parens = format!("{}2{} * 3", "(".repeat(40), ")".repeat(40));
    assert_eq!(run(&parens), Value::Int(6));
    assert_eq!(run(&vec!["1"; 1_000].join(" + ")), Value::Int(1_000));
    assert_eq!(run(&format!("{}5", "-".repeat(30))), Value::Int(5));
}
