//! Typed input parameters and raw expression strings.
//!
//! Templates carry attribute values and parameter fallbacks as unparsed
//! strings ([`RawDyn`]). Query parameters arrive the same way and are bound
//! into a [`LocalScope`] by [`bind_params`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::{Error, SyntaxError};
use crate::runtime::expr::Expr;
use crate::runtime::value::Value;
use crate::scope::{Dyn, LocalScope};
use crate::syntax::parse_expr;
use crate::types::Type;

/// The declared type of a parameter. Every type except `any` converts the
/// parameter's value to that type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Len,
    Angle,
    Col,
    Any,
}

/// Template variables accept the same set of types as parameters.
pub type VarType = ParamType;

impl ParamType {
    pub fn ty(self) -> Option<Type> {
        Some(match self {
            ParamType::Null  => Type::Null,
            ParamType::Bool  => Type::Bool,
            ParamType::Int   => Type::Int,
            ParamType::Float => Type::Float,
            ParamType::Str   => Type::Str,
            ParamType::Len   => Type::Length,
            ParamType::Angle => Type::Angle,
            ParamType::Col   => Type::Color,
            ParamType::Any   => return None,
        })
    }

    pub fn name(self) -> &'static str {
        self.ty().map_or("any", Type::name)
    }
}

impl FromStr for ParamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "any" {
            return Ok(ParamType::Any);
        }
        let ty = Type::from_name(s).ok_or_else(|| format!("unknown type '{s}'"))?;
        Ok(match ty {
            Type::Null   => ParamType::Null,
            Type::Bool   => ParamType::Bool,
            Type::Int    => ParamType::Int,
            Type::Float  => ParamType::Float,
            Type::Str    => ParamType::Str,
            Type::Length => ParamType::Len,
            Type::Angle  => ParamType::Angle,
            Type::Color  => ParamType::Col,
        })
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── RawDyn ──────────────────────────────────────────────────────────────────

/// An expression still in source form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawDyn(pub String);

impl RawDyn {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a string-typed value should be read as an expression: it
    /// starts with `$` or is wrapped in parentheses.
    pub fn is_expression(&self) -> bool {
        let s = self.0.as_str();
        s.starts_with('$') || (s.starts_with('(') && s.ends_with(')'))
    }

    /// Literal text unless [`is_expression`](Self::is_expression), in which
    /// case the expression's result is converted to a string.
    pub fn instantiate_string(&self) -> Result<Dyn<String>, SyntaxError> {
        if self.is_expression() {
            Ok(Dyn::string(parse_expr(&self.0)?))
        } else {
            Ok(Dyn::constant(self.0.clone()))
        }
    }

    pub fn instantiate(&self, ty: Type) -> Result<Dyn<Value>, SyntaxError> {
        Ok(Dyn::eval_as(parse_expr(&self.0)?, ty))
    }

    pub fn instantiate_with<T>(&self, make: impl FnOnce(Expr) -> Dyn<T>) -> Result<Dyn<T>, SyntaxError> {
        Ok(make(parse_expr(&self.0)?))
    }

    /// Compiles the value for storage in a scope, converting to `ty`.
    pub fn instantiate_as_expr(&self, ty: ParamType) -> Result<Expr, SyntaxError> {
        match ty.ty() {
            None => parse_expr(&self.0),
            Some(Type::Str) if !self.is_expression() => Ok(Expr::constant(self.0.as_str())),
            Some(to) => Ok(parse_expr(&self.0)?.then_convert_to(to)),
        }
    }
}

impl fmt::Display for RawDyn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RawDyn {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ─── QueryParam ──────────────────────────────────────────────────────────────

/// A declared input parameter. Without a fallback the parameter is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    #[serde(rename = "type")]
    pub ty: ParamType,
    #[serde(default)]
    pub fallback: Option<RawDyn>,
    #[serde(default)]
    pub desc: Option<String>,
}

impl QueryParam {
    pub fn required(ty: ParamType) -> Self {
        Self { ty, fallback: None, desc: None }
    }

    pub fn optional(ty: ParamType, fallback: impl Into<String>) -> Self {
        Self { ty, fallback: Some(RawDyn(fallback.into())), desc: None }
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// One line of usage text, e.g. `size: len (optional, default: 10px)    # Font size`.
    pub fn help_line(&self, name: &str) -> String {
        let mut line = format!("{name}: {}", self.ty);
        match &self.fallback {
            Some(f) => line.push_str(&format!(" (optional, default: {f})")),
            None => line.push_str(" (required)"),
        }
        if let Some(desc) = &self.desc {
            line.push_str(&format!("    # {desc}"));
        }
        line
    }
}

// ─── Binding ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("Missing required input parameter '{0}'")]
    Missing(String),

    #[error("Malformed input parameter '{name}'")]
    Malformed {
        name: String,
        #[source]
        source: Error,
    },
}

/// Builds a scope from declared parameters and the raw values supplied for
/// them. Absent values fall back to the declaration's default.
pub fn bind_params<'a, K>(
    decls: impl IntoIterator<Item = (K, &'a QueryParam)>,
    mut lookup: impl FnMut(&str) -> Option<String>,
) -> Result<LocalScope, ParamError>
where
    K: AsRef<str>,
{
    let mut scope = LocalScope::new();
    for (name, param) in decls {
        let name = name.as_ref();
        let raw = match lookup(name) {
            Some(v) => RawDyn(v),
            None => param.fallback.clone().ok_or_else(|| ParamError::Missing(name.to_string()))?,
        };
        let expr = raw.instantiate_as_expr(param.ty).map_err(|e| ParamError::Malformed {
            name: name.to_string(),
            source: e.into(),
        })?;
        debug!(name, ty = %param.ty, "bound parameter");
        scope.set_expr(name, expr);
    }
    Ok(scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeExt;
    use std::collections::BTreeMap;
    use std::error::Error as _;

    fn value(scope: &LocalScope, name: &str) -> Value {
        scope.eval(&Expr::name(name)).unwrap()
    }

    #[test]
    fn param_type_names() {
        assert_eq!(ParamType::Len.ty(), Some(Type::Length));
        assert_eq!(ParamType::Any.ty(), None);
        assert_eq!(ParamType::Col.to_string(), "col");
        assert_eq!("len".parse::<ParamType>(), Ok(ParamType::Len));
        assert_eq!("any".parse::<ParamType>(), Ok(ParamType::Any));
        assert!("length".parse::<ParamType>().is_err());
        let t: ParamType = toml::from_str::<BTreeMap<String, ParamType>>("t = 'angle'").unwrap()["t"];
        assert_eq!(t, ParamType::Angle);
    }

    #[test]
    fn strings_are_literal_unless_marked() {
        let lit = RawDyn::from("hello $world");
        assert!(!lit.is_expression());
        assert_eq!(lit.instantiate_as_expr(ParamType::Str).unwrap().as_constant(), Some(Value::from("hello $world")));

        let e = RawDyn::from("(1 + 2)").instantiate_as_expr(ParamType::Str).unwrap();
        assert_eq!(e.eval_with(|_| None), Ok(Value::from("3")));
        let e = RawDyn::from("$n").instantiate_string().unwrap();
        let mut s = LocalScope::new();
        s.set("n", 4i64);
        assert_eq!(e.via(&s), Ok("4".to_string()));
    }

    #[test]
    fn typed_params_convert() {
        let e = RawDyn::from("'12'").instantiate_as_expr(ParamType::Int).unwrap();
        assert_eq!(e.eval_with(|_| None), Ok(Value::Int(12)));
        let e = RawDyn::from("3 + 0.5").instantiate_as_expr(ParamType::Any).unwrap();
        assert_eq!(e.eval_with(|_| None), Ok(Value::Float(3.5)));
        let d = RawDyn::from("7").instantiate(Type::Float).unwrap();
        assert_eq!(d.via(&LocalScope::new()), Ok(Value::Float(7.0)));
    }

    #[test]
    fn help_lines() {
        let p = QueryParam::optional(ParamType::Len, "10px").with_desc("Font size");
        assert_eq!(p.help_line("size"), "size: len (optional, default: 10px)    # Font size");
        assert_eq!(QueryParam::required(ParamType::Str).help_line("title"), "title: str (required)");
    }

    #[test]
    fn query_param_from_toml() {
        let p: QueryParam = toml::from_str("type = 'int'\nfallback = '$base * 2'").unwrap();
        assert_eq!(p.ty, ParamType::Int);
        assert_eq!(p.fallback, Some(RawDyn::from("$base * 2")));
        assert_eq!(p.desc, None);
    }

    #[test]
    fn binds_supplied_and_fallback_values() {
        let mut decls = BTreeMap::new();
        decls.insert("title".to_string(), QueryParam::required(ParamType::Str));
        decls.insert("count".to_string(), QueryParam::optional(ParamType::Int, "2.7"));
        let scope = bind_params(&decls, |n| (n == "title").then(|| "Badge".to_string())).unwrap();
        assert_eq!(value(&scope, "title"), Value::from("Badge"));
        assert_eq!(value(&scope, "count"), Value::Int(2));
    }

    #[test]
    fn missing_and_malformed() {
        let decls = vec![("size", QueryParam::required(ParamType::Len))];
        let err = bind_params(decls.iter().map(|(n, p)| (*n, p)), |_| None).unwrap_err();
        assert_eq!(err.to_string(), "Missing required input parameter 'size'");

        let err = bind_params(decls.iter().map(|(n, p)| (*n, p)), |_| Some("1 +".into())).unwrap_err();
        assert_eq!(err.to_string(), "Malformed input parameter 'size'");
        assert!(matches!(err.source(), Some(_)));
    }
}
