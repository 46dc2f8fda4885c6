use crate::runtime::value::Value;
use crate::types::TypeOps;

fn convert(_: &Value) -> Option<Value> {
    Some(Value::Null)
}

pub(crate) const OPS: TypeOps = TypeOps { convert, ..TypeOps::BASE };
