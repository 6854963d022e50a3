//! Sequence utilities
//!
//! Pure functions over ordered sequences of rows or values.

use serde_json::{Map, Value};
use super::errors::{QueryError, Result};
use super::types::{expect, expect_f64, ValueKind};
use super::value;

/// Element at `index`; negative indexes count from the end
pub fn nth(sequence: &[Value], index: i64) -> Result<Value> {
    let len = sequence.len() as i64;
    let resolved = if index < 0 { len + index } else { index };
    if resolved < 0 || resolved >= len {
        return Err(QueryError::Range("Index out of bounds".to_string()));
    }
    Ok(sequence[resolved as usize].clone())
}

/// Project `attr` out of every row, skipping rows without it
pub fn get_field(sequence: &[Value], attr: &str) -> Result<Vec<Value>> {
    let mut results = Vec::new();
    for row in sequence {
        let object = as_object(row)?;
        if let Some(field) = object.get(attr) {
            results.push(field.clone());
        }
    }
    Ok(results)
}

/// Rows that carry every one of `attrs`
pub fn has_fields(sequence: &[Value], attrs: &[String]) -> Result<Vec<Value>> {
    let mut results = Vec::new();
    for row in sequence {
        if value::has_fields(as_object(row)?, attrs) {
            results.push(row.clone());
        }
    }
    Ok(results)
}

/// Options accepted as the trailing argument of `slice`
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SliceBounds {
    /// Exclude the start index
    pub left_open: bool,
    /// Include the end index
    pub right_closed: bool,
}

impl SliceBounds {
    pub fn from_options(options: &Map<String, Value>) -> Self {
        SliceBounds {
            left_open: options.get("leftBound").and_then(Value::as_str) == Some("open"),
            right_closed: options.get("rightBound").and_then(Value::as_str) == Some("closed"),
        }
    }
}

/// Contiguous sub-sequence.
///
/// `args` holds `start`, an optional `end` (defaults to the length) and an
/// optional trailing options object. Bounds follow `Array.prototype.slice`:
/// negative values count from the end and everything is clamped.
pub fn slice(sequence: &[Value], mut args: Vec<Value>) -> Result<Vec<Value>> {
    let bounds = match args.last() {
        Some(Value::Object(options)) => {
            let bounds = SliceBounds::from_options(options);
            args.pop();
            bounds
        }
        _ => SliceBounds::default(),
    };

    let len = sequence.len() as i64;
    let mut start = match args.first() {
        Some(start) => expect_f64(start)? as i64,
        None => return Err(QueryError::Type("Expected type NUMBER but found NULL".to_string())),
    };
    let mut end = match args.get(1) {
        None | Some(Value::Null) => len,
        Some(end) => expect_f64(end)? as i64,
    };

    if bounds.left_open {
        start += 1;
    }
    if bounds.right_closed {
        end += 1;
    }

    let clamp = |index: i64| -> usize {
        let index = if index < 0 { len + index } else { index };
        index.clamp(0, len) as usize
    };
    let (start, end) = (clamp(start), clamp(end));
    if start >= end {
        return Ok(Vec::new());
    }
    Ok(sequence[start..end].to_vec())
}

pub fn pluck(rows: &[Value], fields: &[String]) -> Result<Vec<Value>> {
    rows.iter()
        .map(|row| Ok(Value::Object(value::pluck(as_object(row)?, fields))))
        .collect()
}

pub fn without(rows: &[Value], fields: &[String]) -> Result<Vec<Value>> {
    rows.iter()
        .map(|row| Ok(Value::Object(value::without(as_object(row)?, fields))))
        .collect()
}

/// Indexes of every element deep-equal to `needle`
pub fn offsets_of(sequence: &[Value], needle: &Value) -> Vec<usize> {
    sequence
        .iter()
        .enumerate()
        .filter(|(_, element)| value::equals(element, needle))
        .map(|(index, _)| index)
        .collect()
}

/// Stable sort of rows by one field
pub fn order_by(sequence: &[Value], attr: &str) -> Result<Vec<Value>> {
    for row in sequence {
        as_object(row)?;
    }
    let mut sorted = sequence.to_vec();
    sorted.sort_by(|a, b| {
        let left = a.get(attr).unwrap_or(&Value::Null);
        let right = b.get(attr).unwrap_or(&Value::Null);
        value::compare(left, right)
    });
    Ok(sorted)
}

fn as_object(row: &Value) -> Result<&Map<String, Value>> {
    expect(row, ValueKind::Object)?;
    row.as_object()
        .ok_or_else(|| QueryError::Type("Expected type OBJECT".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn letters() -> Vec<Value> {
        vec![json!("a"), json!("b"), json!("c"), json!("d")]
    }

    #[test]
    fn test_nth() {
        let seq = vec![json!("a"), json!("b"), json!("c")];
        assert_eq!(nth(&seq, 0).unwrap(), json!("a"));
        assert_eq!(nth(&seq, -1).unwrap(), json!("c"));
        assert_eq!(nth(&seq, -3).unwrap(), json!("a"));
        assert_eq!(nth(&seq, -4), Err(QueryError::Range("Index out of bounds".into())));
        assert!(nth(&seq, 3).is_err());
    }

    #[test]
    fn test_slice() {
        assert_eq!(slice(&letters(), vec![json!(1), json!(3)]).unwrap(), vec![json!("b"), json!("c")]);
        assert_eq!(
            slice(&letters(), vec![json!(1), json!(3), json!({"rightBound": "closed"})]).unwrap(),
            vec![json!("b"), json!("c"), json!("d")]
        );
        assert_eq!(
            slice(&letters(), vec![json!(0), json!(2), json!({"leftBound": "open"})]).unwrap(),
            vec![json!("b")]
        );
        assert_eq!(slice(&letters(), vec![json!(2)]).unwrap(), vec![json!("c"), json!("d")]);
        assert_eq!(slice(&letters(), vec![json!(-2)]).unwrap(), vec![json!("c"), json!("d")]);
        assert!(slice(&letters(), vec![json!(3), json!(1)]).unwrap().is_empty());
        assert!(slice(&letters(), vec![json!("a")]).is_err());
    }

    #[test]
    fn test_get_field_skips_missing() {
        let rows = vec![
            json!({"id": 1, "gender": "F"}),
            json!({"id": 2, "gender": "F", "preference": "M"}),
            json!({"id": 3, "gender": "M", "preference": "F"}),
        ];
        assert_eq!(get_field(&rows, "gender").unwrap(), vec![json!("F"), json!("F"), json!("M")]);
        assert_eq!(get_field(&rows, "preference").unwrap(), vec![json!("M"), json!("F")]);
        assert_eq!(has_fields(&rows, &["preference".to_string()]).unwrap().len(), 2);
        assert!(get_field(&[json!(1)], "a").is_err());
    }

    #[test]
    fn test_order_by_and_offsets() {
        let rows = vec![json!({"name": "Sheila"}), json!({"name": "Alec"}), json!({"name": "Betsy"})];
        let sorted = order_by(&rows, "name").unwrap();
        assert_eq!(get_field(&sorted, "name").unwrap(), vec![json!("Alec"), json!("Betsy"), json!("Sheila")]);
        assert_eq!(offsets_of(&rows, &json!({"name": "Betsy"})), vec![2]);
    }
}
