//! Per-node query context
//!
//! Every action receives a [`QueryContext`] describing the node it runs on:
//! its type tag and, for values taken from a table, which table and which row.

use serde_json::Value;
use super::errors::{QueryError, Result};
use super::store::Store;
use super::types::TypeTag;
use super::value::{equals, strict_equals, PRIMARY_KEY};

/// Table binding carried between evaluation nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    pub table_id: Option<String>,
    pub row_index: Option<usize>,
    pub row_id: Option<Value>,
}

impl Binding {
    pub fn table(table_id: impl Into<String>) -> Self {
        Binding {
            table_id: Some(table_id.into()),
            ..Binding::default()
        }
    }
}

/// Context handed to an action
pub struct QueryContext<'a> {
    /// Type of the receiver
    pub ty: TypeTag,
    /// The store the receiver was read from
    pub db: &'a mut dyn Store,
    pub table_id: Option<String>,
    /// Position of the bound row; stale once the table is structurally mutated
    pub row_index: Option<usize>,
    pub row_id: Option<Value>,
}

impl<'a> QueryContext<'a> {
    pub fn new(db: &'a mut dyn Store, ty: TypeTag, binding: Binding) -> Self {
        QueryContext {
            ty,
            db,
            table_id: binding.table_id,
            row_index: binding.row_index,
            row_id: binding.row_id,
        }
    }

    /// Context for a detached value
    pub fn datum(db: &'a mut dyn Store) -> Self {
        QueryContext::new(db, TypeTag::Datum, Binding::default())
    }

    pub fn binding(&self) -> Binding {
        Binding {
            table_id: self.table_id.clone(),
            row_index: self.row_index,
            row_id: self.row_id.clone(),
        }
    }

    /// Fail unless the receiver is a table, a row or a row set
    pub fn expect_selection(&self) -> Result<()> {
        if !self.ty.is_selection() {
            return Err(self.selection_error("SELECTION"));
        }
        Ok(())
    }

    /// Fail unless the receiver has exactly the given type
    pub fn expect_type(&self, ty: TypeTag) -> Result<()> {
        if self.ty != ty {
            let expected = if ty == TypeTag::Table { "TABLE" } else { "SELECTION" };
            return Err(self.selection_error(expected));
        }
        Ok(())
    }

    fn selection_error(&self, expected: &str) -> QueryError {
        QueryError::Selection(format!("Expected type {} but found {}", expected, self.ty))
    }

    /// Name of the bound table
    pub fn table_name(&self) -> Result<String> {
        self.table_id.clone().ok_or_else(|| {
            QueryError::Selection(format!("Expected type TABLE but found {}", self.ty))
        })
    }

    /// Live rows of the bound table
    pub fn rows(&self) -> Result<&Vec<Value>> {
        let name = self.table_name()?;
        self.db.table(&name)
    }

    /// Mutable rows of the bound table
    pub fn rows_mut(&mut self) -> Result<&mut Vec<Value>> {
        let name = self.table_name()?;
        self.db.table_mut(&name)
    }

    /// Position of `row` in the bound table, trusting `row_index` only if it
    /// still points at the same row
    pub fn locate(&self, row: &Value) -> Result<Option<usize>> {
        let rows = self.rows()?;
        if let Some(index) = self.row_index {
            if rows.get(index).map_or(false, |live| same_row(live, row)) {
                return Ok(Some(index));
            }
        }
        Ok(rows.iter().position(|live| same_row(live, row)))
    }

    /// Record which row of a stream was picked, so the result can act as a
    /// selection. `hint` is the position in the stream.
    pub fn bind_row(&mut self, row: &Value, hint: usize) -> Result<()> {
        if !self.ty.is_stream() {
            return Ok(());
        }
        self.row_index = if self.ty == TypeTag::Table { Some(hint) } else { None };
        self.row_index = self.locate(row)?;
        self.row_id = row.get(PRIMARY_KEY).cloned();
        Ok(())
    }
}

/// Row identity: the primary key when both rows carry one, the whole row otherwise
pub fn same_row(a: &Value, b: &Value) -> bool {
    match (a.get(PRIMARY_KEY), b.get(PRIMARY_KEY)) {
        (Some(x), Some(y)) => strict_equals(x, y),
        _ => equals(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_same_row() {
        assert!(same_row(&json!({"id": 1, "a": 1}), &json!({"id": 1, "a": 2})));
        assert!(!same_row(&json!({"id": 1}), &json!({"id": "1"})));
        assert!(same_row(&json!({"a": 1}), &json!({"a": 1})));
    }

    #[test]
    fn test_locate_discards_stale_index() {
        let mut store = MemoryStore::from_fixture(json!({
            "users": [{"id": 1}, {"id": 2}, {"id": 3}]
        })).unwrap();
        let binding = Binding {
            table_id: Some("users".into()),
            row_index: Some(0),
            row_id: Some(json!(3)),
        };
        let ctx = QueryContext::new(&mut store, TypeTag::Selection, binding);
        assert_eq!(ctx.locate(&json!({"id": 3})).unwrap(), Some(2));
        assert_eq!(ctx.locate(&json!({"id": 1})).unwrap(), Some(0));
        assert_eq!(ctx.locate(&json!({"id": 9})).unwrap(), None);
    }

    #[test]
    fn test_expect_selection() {
        let mut store = MemoryStore::new();
        let ctx = QueryContext::datum(&mut store);
        let err = ctx.expect_selection().unwrap_err();
        assert_eq!(err, QueryError::Selection("Expected type SELECTION but found DATUM".into()));
        assert!(ctx.rows().is_err());
    }
}
