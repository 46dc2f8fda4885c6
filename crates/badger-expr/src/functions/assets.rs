use std::sync::Arc;

use super::FunctionRegistry;
use crate::runtime::value::Value;

/// Answers whether an asset reference resolves. Implemented by the asset layer.
pub trait AssetProbe: Send + Sync {
    fn exists(&self, asset: &str) -> bool;
}

impl<F> AssetProbe for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn exists(&self, asset: &str) -> bool {
        self(asset)
    }
}

pub(crate) fn register(r: &mut FunctionRegistry, probe: Arc<dyn AssetProbe>) {
    r.register_fixed("exists", 1, move |args: &[Value]| {
        let asset = args[0].string();
        if asset.is_empty() {
            return Ok(Value::Bool(false));
        }
        Ok(Value::Bool(probe.exists(&asset)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exists_asks_the_probe() {
        let probe: Arc<dyn AssetProbe> = Arc::new(|name: &str| name == "logo.png");
        let r = FunctionRegistry::new().with_exists(probe);
        let exists = r.get("exists").unwrap();
        assert_eq!(exists.call(&[Value::from("logo.png")]), Ok(Value::Bool(true)));
        assert_eq!(exists.call(&[Value::from("nope.png")]), Ok(Value::Bool(false)));
        assert_eq!(exists.call(&[Value::from("")]), Ok(Value::Bool(false)));
    }
}
