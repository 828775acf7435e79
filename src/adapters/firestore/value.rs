//! Conversion between plain JSON and Firestore's typed value encoding
//! (`{"stringValue": "..."}`, `{"integerValue": "42"}`, ...).

use serde_json::{json, Map, Number, Value};

use crate::domain::model::Fields;

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // integerValue 以字串傳遞
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    )
}

pub fn decode_value(typed: &Value) -> Result<Value, String> {
    let obj = typed
        .as_object()
        .ok_or_else(|| format!("typed value must be an object, got {}", typed))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| "empty typed value".to_string())?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| format!("booleanValue is not a bool: {}", inner)),
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| format!("integerValue '{}': {}", s, e)),
            Value::Number(n) => Ok(Value::Number(n.clone())),
            other => Err(format!("integerValue is not numeric: {}", other)),
        },
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("doubleValue is not a finite number: {}", inner)),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| format!("{} is not a string: {}", kind, inner)),
        "arrayValue" => match inner.get("values") {
            Some(Value::Array(values)) => values
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Some(other) => Err(format!("arrayValue.values is not an array: {}", other)),
            None => Ok(Value::Array(Vec::new())),
        },
        "mapValue" => match inner.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields).map(Value::Object),
            Some(other) => Err(format!("mapValue.fields is not an object: {}", other)),
            None => Ok(Value::Object(Map::new())),
        },
        "geoPointValue" => Ok(inner.clone()),
        other => Err(format!("unsupported value type '{}'", other)),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Fields, String> {
    fields
        .iter()
        .map(|(key, typed)| {
            decode_value(typed)
                .map(|value| (key.clone(), value))
                .map_err(|e| format!("field '{}': {}", key, e))
        })
        .collect()
}
