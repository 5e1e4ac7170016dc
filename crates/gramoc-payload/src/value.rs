use std::fmt::{self, Write as _};

use gramoc_frame::DataType;
use serde::Serialize;

/// A typed application value carried in a frame payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Structured key/value data. Received only; it has no wire encoding.
    Map(serde_json::Map<String, serde_json::Value>),
    String(String),
    Int(i64),
    Float(f64),
    ListInt(Vec<i64>),
    ListFloat(Vec<f64>),
}

impl Value {
    /// Data type tag this value travels under.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Map(_) => DataType::Map,
            Value::String(_) => DataType::String,
            Value::Int(_) => DataType::Int,
            Value::Float(_) => DataType::Float,
            Value::ListInt(_) => DataType::ListInt,
            Value::ListFloat(_) => DataType::ListFloat,
        }
    }

    /// Borrow the text of a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    /// Integer content of an `Int` value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric content of a `Float` value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow the map of a `Map` value.
    pub fn as_map(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Float text that parses back to the same `f64` and always carries a
/// decimal point or exponent (`1.0`, not `1`).
pub(crate) fn format_float(value: f64) -> String {
    format!("{value:?}")
}

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    fmt_item: fn(&T) -> String,
) -> fmt::Result {
    f.write_char('[')?;
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        f.write_str(&fmt_item(item))?;
    }
    f.write_char(']')
}

/// Formats the value exactly as it is written on the wire.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Map(map) => match serde_json::to_string(map) {
                Ok(text) => f.write_str(&text),
                Err(_) => Err(fmt::Error),
            },
            Value::String(text) => f.write_str(text),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => f.write_str(&format_float(*n)),
            Value::ListInt(items) => write_list(f, items, |n| n.to_string()),
            Value::ListFloat(items) => write_list(f, items, |n| format_float(*n)),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<Vec<i64>> for Value {
    fn from(value: Vec<i64>) -> Self {
        Value::ListInt(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::ListFloat(value)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Value {
    fn from(value: serde_json::Map<String, serde_json::Value>) -> Self {
        Value::Map(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_tags() {
        assert_eq!(Value::from("x").data_type(), DataType::String);
        assert_eq!(Value::from(3i64).data_type(), DataType::Int);
        assert_eq!(Value::from(3.5f64).data_type(), DataType::Float);
        assert_eq!(Value::from(vec![1i64]).data_type(), DataType::ListInt);
        assert_eq!(Value::from(vec![1.0f64]).data_type(), DataType::ListFloat);
        assert_eq!(Value::from(serde_json::Map::new()).data_type(), DataType::Map);
    }

    #[test]
    fn display_matches_wire_text() {
        assert_eq!(Value::from("Hallo Server").to_string(), "Hallo Server");
        assert_eq!(Value::from(-42i64).to_string(), "-42");
        assert_eq!(Value::from(1.0f64).to_string(), "1.0");
        assert_eq!(Value::from(-0.25f64).to_string(), "-0.25");
        assert_eq!(Value::from(vec![1i64, -2, 3]).to_string(), "[1, -2, 3]");
        assert_eq!(Value::from(vec![0.5f64, 2.0]).to_string(), "[0.5, 2.0]");
        assert_eq!(Value::from(Vec::<i64>::new()).to_string(), "[]");
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::from("ACK").as_str(), Some("ACK"));
        assert_eq!(Value::from(7i64).as_int(), Some(7));
        assert_eq!(Value::from(7i64).as_str(), None);
        assert_eq!(Value::from(2.5f64).as_float(), Some(2.5));
        assert!(Value::from(serde_json::Map::new()).as_map().is_some());
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&Value::from(vec![1i64, 2])).unwrap();
        assert_eq!(json, "[1,2]");
        let json = serde_json::to_string(&Value::from("hi")).unwrap();
        assert_eq!(json, "\"hi\"");
    }
}
