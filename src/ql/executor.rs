//! Query executor

use log::debug;
use serde_json::Value;

use crate::core::errors::Result;
use crate::core::store::Store;
use crate::ql::ast::Term;
use crate::ql::evaluator::Evaluator;
use crate::ql::parser::parse_query;

/// Parse and run a query string against the store
pub fn execute_query(store: &mut dyn Store, query: &str) -> Result<Value> {
    let term = parse_query(query)?;
    debug!("Executing query: {}", query.trim());
    execute_term(store, &term)
}

/// Run an already parsed term against the store
pub fn execute_term(store: &mut dyn Store, term: &Term) -> Result<Value> {
    Evaluator::new(store).run(term)
}
