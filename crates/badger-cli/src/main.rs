//! The badger expression CLI.
//!
//! - `badger eval <expr>` - Evaluate an expression against config vars and params
//! - `badger disasm <expr>` - Print the compiled instruction listing
//! - `badger check [expr...]` - Parse expressions and the config without evaluating

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use badger_expr::{
    AssetProbe, Expr, FunctionRegistry, ParamType, ScopeStack, SyntaxError, Value, bind_params, eval_in, parse_expr,
};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::{CliConfig, compile_vars};

#[derive(Parser)]
#[command(name = "badger", version, about = "Badge template expression tool")]
struct Cli {
    /// TOML file with [eval], [metrics], [vars] and [params] tables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression
    Eval {
        expr: String,

        /// Define a variable as an expression (repeatable), e.g. --var 'w=10px'
        #[arg(long = "var", value_parser = key_value)]
        vars: Vec<(String, String)>,

        /// Supply a raw value for a declared parameter (repeatable)
        #[arg(short, long = "param", value_parser = key_value)]
        params: Vec<(String, String)>,

        /// Convert the result before printing
        #[arg(long = "as")]
        as_type: Option<ParamType>,

        /// Print lengths as pixels using the configured metrics
        #[arg(long)]
        px: bool,
    },
    /// Print the instruction listing of an expression
    Disasm {
        expr: String,
    },
    /// Check that expressions and the config compile
    Check {
        exprs: Vec<String>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = CliConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Eval { expr, vars, params, as_type, px } => eval(&cfg, &expr, &vars, &params, as_type, px),
        Commands::Disasm { expr } => disasm(&expr),
        Commands::Check { exprs } => check(&cfg, &exprs),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn key_value(s: &str) -> Result<(String, String), String> {
    let (k, v) = s.split_once('=').ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    if k.is_empty() {
        return Err(format!("missing name in '{s}'"));
    }
    Ok((k.to_string(), v.to_string()))
}

fn compile(text: &str) -> Result<Expr> {
    parse_expr(text).map_err(|e| anyhow::anyhow!(syntax_message(&e)))
}

fn syntax_message(e: &SyntaxError) -> String {
    format!("error[{}]: {e}", e.code.as_str())
}

fn file_probe() -> Arc<dyn AssetProbe> {
    Arc::new(|asset: &str| Path::new(asset).exists())
}

// ─── eval ────────────────────────────────────────────────────────────────────

fn eval(
    cfg: &CliConfig,
    text: &str,
    vars: &[(String, String)],
    params: &[(String, String)],
    as_type: Option<ParamType>,
    px: bool,
) -> Result<()> {
    for (name, _) in params {
        if !cfg.params.contains_key(name) {
            bail!("unknown parameter '{name}'");
        }
    }

    let functions = FunctionRegistry::standard().with_exists(file_probe());
    let mut stack = ScopeStack::new()
        .with_functions(Arc::new(functions))
        .with_config(cfg.eval);

    // Searched in order: --var, parameters, [vars].
    stack.push_back(Arc::new(compile_vars(vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))?));
    let bound = bind_params(&cfg.params, |name| {
        params.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    })?;
    stack.push_back(Arc::new(bound));
    stack.push_back(Arc::new(cfg.var_scope()?));

    let mut expr = compile(text)?;
    if let Some(to) = as_type.and_then(ParamType::ty) {
        expr = expr.then_convert_to(to);
    }
    debug!(%expr, "evaluating");
    let value = eval_in(&stack, &expr).with_context(|| format!("evaluating '{text}'"))?;

    match value {
        Value::Length(len) if px => println!("{}", badger_expr::types::format_double(cfg.metrics.pixels(&len))),
        v => println!("{}", v.string()),
    }
    Ok(())
}

// ─── disasm ──────────────────────────────────────────────────────────────────

fn disasm(text: &str) -> Result<()> {
    let expr = compile(text)?;
    expr.write_debug(|line| println!("{line}"));
    Ok(())
}

// ─── check ───────────────────────────────────────────────────────────────────

fn check(cfg: &CliConfig, exprs: &[String]) -> Result<()> {
    let mut failed = 0usize;

    for (name, src) in &cfg.vars {
        if let Err(e) = parse_expr(src) {
            eprintln!("var {name}: {}", syntax_message(&e));
            failed += 1;
        }
    }
    for (name, param) in &cfg.params {
        if let Some(Err(e)) = param.fallback.as_ref().map(|f| f.instantiate_as_expr(param.ty)) {
            eprintln!("param {name}: {}", syntax_message(&e));
            failed += 1;
        }
        println!("{}", param.help_line(name));
    }
    for src in exprs {
        match parse_expr(src) {
            Ok(_) => println!("ok: {src}"),
            Err(e) => {
                eprintln!("{src}: {}", syntax_message(&e));
                failed += 1;
            }
        }
    }

    info!(failed, "check finished");
    if failed > 0 {
        bail!("{failed} expression(s) failed to compile");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_pairs() {
        assert_eq!(key_value("w=1 + 2"), Ok(("w".into(), "1 + 2".into())));
        assert_eq!(key_value("eq=$a==$b"), Ok(("eq".into(), "$a==$b".into())));
        assert!(key_value("novalue").is_err());
        assert!(key_value("=1").is_err());
    }

    #[test]
    fn syntax_messages_carry_code() {
        let e = parse_expr("1 2").unwrap_err();
        assert_eq!(syntax_message(&e), format!("error[P003]: {e}"));
    }
}
