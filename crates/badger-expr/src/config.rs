use serde::{Deserialize, Serialize};

use crate::types::length::Length;

/// Limits applied while resolving variables through a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// How many variable definitions may be in progress at once before
    /// evaluation gives up.
    pub max_depth: usize,
}

impl EvalConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 256;
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { max_depth: Self::DEFAULT_MAX_DEPTH }
    }
}

/// Rendering context needed to turn a [`Length`] into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub dpi: f64,
    pub parent_size: f64,
    pub self_size: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self { dpi: 96.0, parent_size: 0.0, self_size: 0.0 }
    }
}

impl Metrics {
    pub fn pixels(&self, len: &Length) -> f64 {
        len.to_pixels(self.dpi, self.parent_size, self.self_size)
    }

    pub fn inches(&self, len: &Length) -> f64 {
        len.to_inches(self.dpi, self.parent_size, self.self_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(EvalConfig::default().max_depth, 256);
        assert_eq!(Metrics::default().dpi, 96.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let m: Metrics = toml::from_str("dpi = 300.0\nparent_size = 200.0").unwrap();
        assert_eq!(m, Metrics { dpi: 300.0, parent_size: 200.0, self_size: 0.0 });
        let c: EvalConfig = toml::from_str("").unwrap();
        assert_eq!(c, EvalConfig::default());
    }

    #[test]
    fn resolves_lengths() {
        let m = Metrics { dpi: 100.0, parent_size: 400.0, self_size: 50.0 };
        let len = Length::pixels(5.0) + Length::inches(2.0) + Length::parent_perc(10.0) + Length::self_perc(50.0);
        assert_eq!(m.pixels(&len), 5.0 + 200.0 + 40.0 + 25.0);
    }
}
