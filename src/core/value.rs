//! Value helpers
//!
//! Rows and query results are plain `serde_json` values. This module holds
//! the primitives the actions are built on: equality, ordering, number
//! normalisation, deep merge and object projection.

use std::cmp::Ordering;
use serde_json::{Map, Value};
use uuid::Uuid;
use super::errors::{QueryError, Result};
use super::types::{expect_str, ValueKind};

/// Name of the primary key field
pub const PRIMARY_KEY: &str = "id";

/// Generate a fresh primary key
pub fn fresh_id() -> Value {
    Value::String(Uuid::new_v4().to_string())
}

/// Deep equality; numbers compare numerically
pub fn equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| equals(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, l)| y.get(key).map_or(false, |r| equals(l, r)))
        }
        _ => a == b,
    }
}

/// Equality without coercion between kinds
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    ValueKind::of(a) == ValueKind::of(b) && equals(a, b)
}

/// Total order over values: first by kind, then within the kind
pub fn compare(a: &Value, b: &Value) -> Ordering {
    let (ka, kb) = (ValueKind::of(a), ValueKind::of(b));
    if ka != kb {
        return ka.cmp(&kb);
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or_default(), y.as_f64().unwrap_or_default());
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y) {
                let ord = compare(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => Ordering::Equal,
    }
}

/// Anything but `false` and `null` is truthy
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// Build a JSON number, keeping whole results as integers
pub fn number(value: f64) -> Result<Value> {
    if !value.is_finite() {
        return Err(QueryError::Range(format!("Number not representable: {}", value)));
    }
    // 2^53: past this point f64 no longer holds every integer.
    if value.fract() == 0.0 && value.abs() <= 9_007_199_254_740_992.0 {
        return Ok(Value::from(value as i64));
    }
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| QueryError::Range(format!("Number not representable: {}", value)))
}

/// A value that may be used as a key: not null and not an object
pub fn is_valid_key(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Object(_))
}

/// Deep-merge `input` into `output`.
///
/// Objects merge key by key, recursing where both sides hold an object;
/// any other input replaces the output wholesale.
pub fn merge_values(output: Value, input: Value) -> Value {
    match (output, input) {
        (Value::Object(mut target), Value::Object(source)) => {
            merge_into(&mut target, source);
            Value::Object(target)
        }
        (_, input) => input,
    }
}

/// Deep-merge `source` into `target` in place
pub fn merge_into(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        let incoming = match value {
            Value::Object(incoming) => incoming,
            other => {
                target.insert(key, other);
                continue;
            }
        };
        if let Some(Value::Object(existing)) = target.get_mut(&key) {
            merge_into(existing, incoming);
            continue;
        }
        target.insert(key, Value::Object(incoming));
    }
}

/// Apply `patch` onto a live row, returning whether anything changed
pub fn update_object(row: &mut Map<String, Value>, patch: Map<String, Value>) -> Result<bool> {
    if let (Some(old_id), Some(new_id)) = (row.get(PRIMARY_KEY), patch.get(PRIMARY_KEY)) {
        if !equals(old_id, new_id) {
            return Err(QueryError::Identity("Primary key `id` cannot be changed".to_string()));
        }
    }
    let before = Value::Object(row.clone());
    merge_into(row, patch);
    Ok(!equals(&before, &Value::Object(row.clone())))
}

/// Field of an object, `null` when missing
pub fn get_field(object: &Map<String, Value>, attr: &str) -> Value {
    object.get(attr).cloned().unwrap_or(Value::Null)
}

pub fn has_fields(object: &Map<String, Value>, attrs: &[String]) -> bool {
    attrs.iter().all(|attr| object.contains_key(attr))
}

/// Keep only the listed fields, in the order they were listed
pub fn pluck(object: &Map<String, Value>, fields: &[String]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|field| object.get(field).map(|value| (field.clone(), value.clone())))
        .collect()
}

/// Drop the listed fields, keeping the order of the rest
pub fn without(object: &Map<String, Value>, fields: &[String]) -> Map<String, Value> {
    object
        .iter()
        .filter(|(key, _)| !fields.iter().any(|field| field == *key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Flatten nested arrays into one list
pub fn flatten(values: Vec<Value>) -> Vec<Value> {
    let mut flat = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::Array(inner) => flat.extend(flatten(inner)),
            other => flat.push(other),
        }
    }
    flat
}

/// Flatten arguments into a list of field names
pub fn field_names(values: Vec<Value>) -> Result<Vec<String>> {
    flatten(values)
        .iter()
        .map(|value| expect_str(value).map(str::to_string))
        .collect()
}
