use crate::runtime::value::Value;
use crate::types::TypeOps;
use crate::types::color::Color;

fn convert(from: &Value) -> Option<Value> {
    let c = match from {
        Value::Null    => Color::TRANSPARENT,
        Value::Int(i)  => Color::from_argb(*i as u32),
        Value::Bool(b) => if *b { Color::BLACK } else { Color::TRANSPARENT },
        Value::Str(s)  => Color::from_hex(s).unwrap_or(Color::TRANSPARENT),
        _ => return None,
    };
    Some(Value::Color(c))
}

pub(crate) const OPS: TypeOps = TypeOps { convert, ..TypeOps::BASE };

#[cfg(test)]
mod tests {
    use crate::runtime::value::Value;
    use crate::types::Type;
    use crate::types::color::Color;

    #[test]
    fn conversions() {
        assert_eq!(Value::Int(0xFF00_FF00).convert(Type::Color), Some(Value::Color(Color::rgb(0, 255, 0))));
        assert_eq!(Value::from("#f00").convert(Type::Color), Some(Value::Color(Color::rgb(255, 0, 0))));
        assert_eq!(Value::from("red").convert(Type::Color), Some(Value::Color(Color::TRANSPARENT)));
        assert_eq!(Value::Float(1.0).convert(Type::Color), None);
    }
}
