use crate::runtime::value::Value;
use crate::types::TypeOps;
use crate::types::compare::Compare;

fn convert(from: &Value) -> Option<Value> {
    Some(Value::Str(from.string()))
}

fn compare(lhs: &Value, rhs: &Value) -> Compare {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Compare::of(a.as_str(), b.as_str()),
        _ => Compare::Incomparable,
    }
}

fn add(lhs: &Value, rhs: &Value) -> Option<Value> {
    Some(Value::Str(lhs.string() + &rhs.string()))
}

/// `|s|` is the length in UTF-16 code units, so characters outside the
/// Basic Multilingual Plane count twice.
fn abs(v: &Value) -> Option<Value> {
    Some(Value::Int(v.string().encode_utf16().count() as i64))
}

pub(crate) const OPS: TypeOps = TypeOps {
    convert,
    compare,
    add: Some(add),
    abs: Some(abs),
    ..TypeOps::BASE
};
