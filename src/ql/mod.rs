//! Query language for Tabletop
//!
//! This module provides the text front-end to the action registry: a pest
//! grammar, the term AST and an evaluator that threads types and table
//! bindings through a chain of actions.

pub mod ast;
pub mod parser;
pub mod evaluator;
pub mod executor;

pub use ast::Term;
pub use executor::{execute_query, execute_term};
