use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use badger_expr::{EvalConfig, LocalScope, Metrics, QueryParam, parse_expr};
use serde::Deserialize;

/// Contents of a `badger.toml` file.
///
/// ```toml
/// [eval]
/// max_depth = 64
///
/// [metrics]
/// dpi = 144.0
///
/// [vars]
/// pad = "4px"
/// inner = "$width - 2 * $pad"
///
/// [params.width]
/// type = "len"
/// fallback = "120px"
/// desc = "Badge width"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub eval: EvalConfig,
    pub metrics: Metrics,
    /// Name → defining expression.
    pub vars: BTreeMap<String, String>,
    pub params: BTreeMap<String, QueryParam>,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Compiles `[vars]` into a scope.
    pub fn var_scope(&self) -> Result<LocalScope> {
        compile_vars(self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

pub fn compile_vars<'a>(defs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<LocalScope> {
    let mut scope = LocalScope::new();
    for (name, src) in defs {
        let expr = parse_expr(src)
            .with_context(|| format!("in definition of variable '{name}'"))?;
        scope.set_expr(name, expr);
    }
    Ok(scope)
}
