//! Term evaluator
//!
//! Walks a [`Term`] tree, resolving every node into a value, its query-level
//! type and the table binding it carries. Action calls go through the
//! registry, which validates arity before dispatching.

use log::trace;
use serde_json::{Map, Value};

use crate::actions::{registry, Argument, Deferred};
use crate::core::context::{Binding, QueryContext};
use crate::core::errors::{QueryError, Result};
use crate::core::store::Store;
use crate::core::types::TypeTag;
use crate::ql::ast::Term;

/// Result of evaluating one node
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluated {
    pub value: Value,
    pub ty: TypeTag,
    pub binding: Binding,
}

impl Evaluated {
    fn datum(value: Value) -> Self {
        Evaluated {
            value,
            ty: TypeTag::Datum,
            binding: Binding::default(),
        }
    }
}

/// Context for term evaluation
pub struct Evaluator<'a> {
    /// The store tables are read from and written to
    store: &'a mut dyn Store,
    /// Row bound to `r.row`, if any
    row: Option<Value>,
}

impl<'a> Evaluator<'a> {
    pub fn new(store: &'a mut dyn Store) -> Self {
        Evaluator { store, row: None }
    }

    pub fn with_row(store: &'a mut dyn Store, row: Option<Value>) -> Self {
        Evaluator { store, row }
    }

    /// Evaluate a term down to its value
    pub fn run(&mut self, term: &Term) -> Result<Value> {
        self.evaluate(term).map(|evaluated| evaluated.value)
    }

    /// Evaluate a term into its value, type and binding
    pub fn evaluate(&mut self, term: &Term) -> Result<Evaluated> {
        match term {
            Term::Table(name) => {
                let rows = self.store.table(name)?.clone();
                Ok(Evaluated {
                    value: Value::Array(rows),
                    ty: TypeTag::Table,
                    binding: Binding::table(name.clone()),
                })
            }
            Term::Datum(value) => Ok(Evaluated::datum(value.clone())),
            Term::Row => self
                .row
                .clone()
                .map(Evaluated::datum)
                .ok_or_else(|| QueryError::Evaluation("`r.row` is only valid inside a row expression".to_string())),
            Term::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| self.run(item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Evaluated::datum(Value::Array(values)))
            }
            Term::Object(fields) => {
                let mut object = Map::new();
                for (key, term) in fields {
                    object.insert(key.clone(), self.run(term)?);
                }
                Ok(Evaluated::datum(Value::Object(object)))
            }
            Term::Call { action, receiver, args } => self.evaluate_call(action, receiver, args),
        }
    }

    fn evaluate_call(&mut self, action: &str, receiver: &Term, args: &[Term]) -> Result<Evaluated> {
        let receiver = self.evaluate(receiver)?;
        let declared = registry().describe(action)?.ty;
        let args = args
            .iter()
            .map(|arg| self.argument(arg))
            .collect::<Result<Vec<_>>>()?;
        let numeric_key = matches!(args.first(), Some(Argument::Datum(Value::Number(_))));

        let receiver_ty = receiver.ty;
        let mut ctx = QueryContext::new(&mut *self.store, receiver_ty, receiver.binding);
        let value = registry().invoke(action, &mut ctx, receiver.value, args)?;

        let ty = declared.resolve(receiver_ty, numeric_key);
        let binding = if ty.is_selection() { ctx.binding() } else { Binding::default() };
        Ok(Evaluated { value, ty, binding })
    }

    /// Build an action argument; terms using `r.row` are deferred
    fn argument(&mut self, term: &Term) -> Result<Argument> {
        if !term.references_row() {
            return self.run(term).map(Argument::Datum);
        }

        trace!("Deferring argument {:?}", term);
        let term = term.clone();
        let outer = self.row.clone();
        Ok(Argument::Deferred(Deferred::new(move |store, row| {
            let row = row.cloned().or_else(|| outer.clone());
            Evaluator::with_row(store, row).run(&term)
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ql::parser::parse_query;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn store() -> MemoryStore {
        MemoryStore::from_fixture(json!({
            "users": [
                {"id": 1, "name": "Alec", "age": 22},
                {"id": 2, "name": "John", "age": 14},
                {"id": 3, "name": "Sam", "age": 18}
            ]
        }))
        .unwrap()
    }

    fn evaluate(store: &mut MemoryStore, query: &str) -> Result<Evaluated> {
        let term = parse_query(query)?;
        Evaluator::new(store).evaluate(&term)
    }

    #[test]
    fn test_types_follow_the_chain() {
        let mut store = store();
        let table = evaluate(&mut store, r#"r.table("users")"#).unwrap();
        assert_eq!(table.ty, TypeTag::Table);

        let row = evaluate(&mut store, r#"r.table("users").get(2)"#).unwrap();
        assert_eq!(row.ty, TypeTag::Selection);
        assert_eq!(row.binding.row_index, Some(1));

        let field = evaluate(&mut store, r#"r.table("users").get(2)("name")"#).unwrap();
        assert_eq!(field.ty, TypeTag::Datum);
        assert_eq!(field.binding, Binding::default());

        let subset = evaluate(&mut store, r#"r.table("users").getAll(1, 3).slice(1)"#).unwrap();
        assert_eq!(subset.ty, TypeTag::SelectionArray);
        assert_eq!(subset.binding.table_id.as_deref(), Some("users"));

        let picked = evaluate(&mut store, r#"r.table("users")(0)"#).unwrap();
        assert_eq!(picked.ty, TypeTag::Selection);
        assert_eq!(picked.value["name"], json!("Alec"));

        let datum = evaluate(&mut store, "r.expr([1, 2, 3]).slice(1)").unwrap();
        assert_eq!(datum.ty, TypeTag::Datum);
    }

    #[test]
    fn test_row_expressions() {
        let mut store = store();
        let report = evaluate(&mut store, r#"r.table("users").update({age: r.row("age").add(1)})"#).unwrap();
        assert_eq!(report.value, json!({"errors": 0, "replaced": 3, "unchanged": 0}));
        assert_eq!(evaluate(&mut store, r#"r.table("users").get(2)("age")"#).unwrap().value, json!(15));

        let adults = evaluate(&mut store, r#"r.table("users").filter(r.row("age").ge(19))("name")"#).unwrap();
        assert_eq!(adults.value, json!(["Alec", "Sam"]));
    }

    #[test]
    fn test_unbound_row() {
        let mut store = store();
        let err = evaluate(&mut store, r#"r.row("age")"#).unwrap_err();
        assert!(matches!(err, QueryError::Evaluation(_)));
    }

    #[test]
    fn test_errors_surface() {
        let mut store = store();
        assert!(matches!(evaluate(&mut store, r#"r.table("nope")"#), Err(QueryError::TableNotFound(_))));
        assert!(matches!(evaluate(&mut store, "r.expr(1).frobnicate()"), Err(QueryError::UnknownAction(_))));
        let err = evaluate(&mut store, r#"r.table("users").get()"#).unwrap_err();
        assert_eq!(err.to_string(), "`get` takes exactly 1 argument, 0 provided");
    }
}
