//! Abstract Syntax Tree for the query language
//!
//! This module defines the structures that represent a parsed query.

use serde_json::{Map, Value};

/// A query term
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// `r.table("name")`
    Table(String),
    /// A literal value
    Datum(Value),
    /// `r.row`, the row a deferred expression is evaluated against
    Row,
    /// An array literal with at least one non-literal element
    Array(Vec<Term>),
    /// An object literal with at least one non-literal field
    Object(Vec<(String, Term)>),
    /// An action applied to a receiver
    Call {
        /// The action id
        action: String,
        /// The term the action is applied to
        receiver: Box<Term>,
        /// The arguments to the action
        args: Vec<Term>,
    },
}

impl Term {
    pub fn call(action: impl Into<String>, receiver: Term, args: Vec<Term>) -> Term {
        Term::Call {
            action: action.into(),
            receiver: Box::new(receiver),
            args,
        }
    }

    /// Array literal, folded into a datum when every element is one
    pub fn array(items: Vec<Term>) -> Term {
        if !items.iter().all(|item| matches!(item, Term::Datum(_))) {
            return Term::Array(items);
        }
        let values = items
            .into_iter()
            .filter_map(|item| match item {
                Term::Datum(value) => Some(value),
                _ => None,
            })
            .collect();
        Term::Datum(Value::Array(values))
    }

    /// Object literal, folded into a datum when every field is one
    pub fn object(fields: Vec<(String, Term)>) -> Term {
        if !fields.iter().all(|(_, term)| matches!(term, Term::Datum(_))) {
            return Term::Object(fields);
        }
        let object: Map<String, Value> = fields
            .into_iter()
            .filter_map(|(key, term)| match term {
                Term::Datum(value) => Some((key, value)),
                _ => None,
            })
            .collect();
        Term::Datum(Value::Object(object))
    }

    /// Whether evaluating the term needs a bound row
    pub fn references_row(&self) -> bool {
        match self {
            Term::Row => true,
            Term::Table(_) | Term::Datum(_) => false,
            Term::Array(items) => items.iter().any(Term::references_row),
            Term::Object(fields) => fields.iter().any(|(_, term)| term.references_row()),
            Term::Call { receiver, args, .. } => {
                receiver.references_row() || args.iter().any(Term::references_row)
            }
        }
    }
}
