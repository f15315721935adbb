// serde_json bridge for loading contexts and fixtures.
// JSON objects become keyword-keyed maps; sets have no JSON form and render
// as arrays, so a round trip through JSON turns a set into a vector.

use crate::attr::Attr;
use crate::error::ResolveResult;
use crate::value::Value;

pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Nil => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(n) => serde_json::Value::from(*n),
        Value::Float(f) => serde_json::Number::from_f64(f.into_inner())
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Keyword(k) => serde_json::Value::String(format!("{}", k)),
        Value::Vector(v) => serde_json::Value::Array(v.iter().map(to_json).collect()),
        Value::Set(s) => serde_json::Value::Array(s.iter().map(to_json).collect()),
        Value::Map(m) => serde_json::Value::Object(
            m.iter().map(|(k, v)| (k.0.clone(), to_json(v))).collect(),
        ),
    }
}

pub fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::string(s),
        serde_json::Value::Array(items) => Value::Vector(items.iter().map(from_json).collect()),
        serde_json::Value::Object(fields) => Value::Map(
            fields
                .iter()
                .map(|(k, v)| (Attr::new(k), from_json(v)))
                .collect(),
        ),
    }
}

/// Parse a JSON document straight into a value.
pub fn parse(input: &str) -> ResolveResult<Value> {
    let json: serde_json::Value = serde_json::from_str(input)?;
    Ok(from_json(&json))
}

/// Render a value as a JSON string.
pub fn render(value: &Value) -> ResolveResult<String> {
    Ok(serde_json::to_string(&to_json(value))?)
}
