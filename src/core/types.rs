//! Type tags
//!
//! Two small lattices live here: [`TypeTag`], the query-level type of an
//! evaluation node (is it a whole table, a bound row, a detached datum...),
//! and [`ValueKind`], the JSON kind of a concrete value.

use std::fmt;
use serde::Serialize;
use serde_json::Value;
use super::errors::{QueryError, Result};

/// Query-level result types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeTag {
    #[serde(rename = "DATUM")]
    Datum,
    #[serde(rename = "SEQUENCE")]
    Sequence,
    #[serde(rename = "ARRAY")]
    Array,
    #[serde(rename = "OBJECT")]
    Object,
    #[serde(rename = "TABLE")]
    Table,
    #[serde(rename = "SELECTION")]
    Selection,
    #[serde(rename = "SELECTION<ARRAY>")]
    SelectionArray,
    #[serde(rename = "BRACKET")]
    Bracket,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Datum => "DATUM",
            TypeTag::Sequence => "SEQUENCE",
            TypeTag::Array => "ARRAY",
            TypeTag::Object => "OBJECT",
            TypeTag::Table => "TABLE",
            TypeTag::Selection => "SELECTION",
            TypeTag::SelectionArray => "SELECTION<ARRAY>",
            TypeTag::Bracket => "BRACKET",
        }
    }

    /// A stream is a sequence that is not fully materialized
    pub fn is_stream(&self) -> bool {
        matches!(self, TypeTag::Table | TypeTag::SelectionArray)
    }

    /// Table, single-row selection or row-set selection
    pub fn is_selection(&self) -> bool {
        matches!(self, TypeTag::Table | TypeTag::Selection | TypeTag::SelectionArray)
    }

    /// Resolve the declared type of an action into the type of its result.
    ///
    /// `receiver` is the type of the value the action was applied to and
    /// `numeric_key` tells whether its first argument was a number.
    pub fn resolve(self, receiver: TypeTag, numeric_key: bool) -> TypeTag {
        match self {
            TypeTag::Table | TypeTag::Selection | TypeTag::SelectionArray => self,
            TypeTag::Sequence if receiver.is_stream() => TypeTag::SelectionArray,
            TypeTag::Bracket if numeric_key && receiver.is_stream() => TypeTag::Selection,
            _ => TypeTag::Datum,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a concrete JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    // Declaration order is the cross-kind sort order.
    Array,
    Bool,
    Null,
    Number,
    Object,
    String,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Array => "ARRAY",
            ValueKind::Bool => "BOOL",
            ValueKind::Null => "NULL",
            ValueKind::Number => "NUMBER",
            ValueKind::Object => "OBJECT",
            ValueKind::String => "STRING",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the kind of a value (`"NUMBER"`, `"OBJECT"`, ...)
pub fn type_of(value: &Value) -> &'static str {
    ValueKind::of(value).as_str()
}

/// Fail with a type error unless `value` is of the given kind
pub fn expect(value: &Value, kind: ValueKind) -> Result<()> {
    let found = ValueKind::of(value);
    if found != kind {
        return Err(QueryError::Type(format!(
            "Expected type {} but found {}",
            kind, found
        )));
    }
    Ok(())
}

/// Borrow the string inside `value`, or fail with a type error
pub fn expect_str(value: &Value) -> Result<&str> {
    expect(value, ValueKind::String)?;
    Ok(value.as_str().unwrap_or_default())
}

/// Read `value` as a float, or fail with a type error
pub fn expect_f64(value: &Value) -> Result<f64> {
    expect(value, ValueKind::Number)?;
    Ok(value.as_f64().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_kinds() {
        assert_eq!(type_of(&json!(null)), "NULL");
        assert_eq!(type_of(&json!(true)), "BOOL");
        assert_eq!(type_of(&json!(1.5)), "NUMBER");
        assert_eq!(type_of(&json!("a")), "STRING");
        assert_eq!(type_of(&json!([1])), "ARRAY");
        assert_eq!(type_of(&json!({"a": 1})), "OBJECT");
    }

    #[test]
    fn test_expect() {
        assert!(expect(&json!({}), ValueKind::Object).is_ok());
        let err = expect(&json!(1), ValueKind::Object).unwrap_err();
        assert_eq!(err, QueryError::Type("Expected type OBJECT but found NUMBER".into()));
        assert_eq!(expect_str(&json!("id")).unwrap(), "id");
        assert_eq!(expect_f64(&json!(3)).unwrap(), 3.0);
    }

    #[test]
    fn test_type_tag_names() {
        assert_eq!(TypeTag::SelectionArray.to_string(), "SELECTION<ARRAY>");
        assert_eq!(serde_json::to_value(TypeTag::SelectionArray).unwrap(), json!("SELECTION<ARRAY>"));
        assert!(TypeTag::Table.is_stream());
        assert!(!TypeTag::Selection.is_stream());
        assert!(TypeTag::Selection.is_selection());
        assert!(!TypeTag::Datum.is_selection());
    }

    #[test]
    fn test_resolve() {
        assert_eq!(TypeTag::Sequence.resolve(TypeTag::Table, false), TypeTag::SelectionArray);
        assert_eq!(TypeTag::Sequence.resolve(TypeTag::Datum, false), TypeTag::Datum);
        assert_eq!(TypeTag::Bracket.resolve(TypeTag::SelectionArray, true), TypeTag::Selection);
        assert_eq!(TypeTag::Bracket.resolve(TypeTag::Table, false), TypeTag::Datum);
        assert_eq!(TypeTag::Bracket.resolve(TypeTag::Selection, true), TypeTag::Datum);
        assert_eq!(TypeTag::Selection.resolve(TypeTag::Table, false), TypeTag::Selection);
        assert_eq!(TypeTag::Array.resolve(TypeTag::Table, false), TypeTag::Datum);
    }
}
