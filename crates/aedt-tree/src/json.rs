//! JSON export.

use crate::{Document, Value};

impl Value {
    /// Convert to JSON.
    ///
    /// `Null` maps to JSON `null`, nested documents to objects with their key
    /// order preserved. NaN and infinities have no JSON form and become
    /// `null` as well.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Document(doc) => doc.to_json(),
        }
    }
}

impl Document {
    /// Convert to a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        for (key, value) in self.iter() {
            obj.insert(key.to_string(), value.to_json());
        }
        serde_json::Value::Object(obj)
    }
}
