//! Purpose: Canonical in-memory representation of a field value.
//! Exports: `FieldValue`.
//! Role: Bridge between raw `serde_json::Value` payloads and validated records.
//! Invariants: Text has a single representation; there is no narrow/wide split.
//! Invariants: Timestamps serialize back to unix seconds.
use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Number, Value};
use time::OffsetDateTime;

use crate::core::record::Record;
use crate::core::timestamp;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    /// Integers beyond `i64::MAX`; only produced from JSON input.
    Long(u64),
    Float(f64),
    Text(String),
    Timestamp(OffsetDateTime),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
    Record(Box<Record>),
}

impl FieldValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(flag) => FieldValue::Bool(*flag),
            Value::Number(number) => from_number(number),
            Value::String(text) => FieldValue::Text(text.clone()),
            Value::Array(items) => FieldValue::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => FieldValue::Map(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(flag) => Value::Bool(*flag),
            FieldValue::Int(value) => Value::from(*value),
            FieldValue::Long(value) => Value::from(*value),
            FieldValue::Float(value) => Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::Timestamp(value) => Value::from(timestamp::to_unix(value)),
            FieldValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            FieldValue::Map(map) => {
                let mut out = Map::new();
                for (key, value) in map {
                    out.insert(key.clone(), value.to_json());
                }
                Value::Object(out)
            }
            FieldValue::Record(record) => record.to_json(),
        }
    }

    /// Short runtime kind label used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Long(_) => "long",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::List(_) => "list",
            FieldValue::Map(_) => "map",
            FieldValue::Record(_) => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            FieldValue::Long(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Int(value) => u64::try_from(*value).ok(),
            FieldValue::Long(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(value) => Some(*value),
            FieldValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<OffsetDateTime> {
        match self {
            FieldValue::Timestamp(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            FieldValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Record(record) => Some(record),
            _ => None,
        }
    }
}

fn from_number(number: &Number) -> FieldValue {
    if let Some(value) = number.as_i64() {
        FieldValue::Int(value)
    } else if let Some(value) = number.as_u64() {
        FieldValue::Long(value)
    } else {
        FieldValue::Float(number.as_f64().unwrap_or(f64::NAN))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Timestamp(value) => write!(f, "{}", timestamp::format_rfc3339(value)),
            FieldValue::Record(record) => write!(f, "{}{}", record.schema().name(), record.to_json()),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(value) => FieldValue::Int(value),
            Err(_) => FieldValue::Long(value),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<OffsetDateTime> for FieldValue {
    fn from(value: OffsetDateTime) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<Record> for FieldValue {
    fn from(value: Record) -> Self {
        FieldValue::Record(Box::new(value))
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        FieldValue::from_json(value)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::from_json(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::FieldValue;
    use serde_json::json;

    #[test]
    fn json_numbers_split_into_int_long_float() {
        assert_eq!(FieldValue::from_json(&json!(7)), FieldValue::Int(7));
        assert_eq!(
            FieldValue::from_json(&json!(18_446_744_073_709_551_615u64)),
            FieldValue::Long(u64::MAX)
        );
        assert_eq!(FieldValue::from_json(&json!(1.5)), FieldValue::Float(1.5));
    }

    #[test]
    fn nested_json_converts_structurally() {
        let value = FieldValue::from_json(&json!({"a": [1, "x"], "b": null}));
        let map = value.as_map().expect("map");
        assert_eq!(
            map.get("a"),
            Some(&FieldValue::List(vec![
                FieldValue::Int(1),
                FieldValue::Text("x".to_string())
            ]))
        );
        assert_eq!(map.get("b"), Some(&FieldValue::Null));
        assert_eq!(value.to_json(), json!({"a": [1, "x"], "b": null}));
    }

    #[test]
    fn u64_conversion_prefers_int_when_it_fits() {
        assert_eq!(FieldValue::from(42u64), FieldValue::Int(42));
        assert_eq!(FieldValue::from(u64::MAX), FieldValue::Long(u64::MAX));
    }
}
