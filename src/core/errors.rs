//! Error types for Tabletop
//!
//! Every failure raised while dispatching an action or evaluating a query
//! is terminal: nothing is retried, the error goes straight back to the caller.

use thiserror::Error;

/// Errors that can occur while evaluating queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Wrong number of arguments for an action
    #[error("{0}")]
    Arity(String),

    /// Receiver or argument has an unexpected type
    #[error("{0}")]
    Type(String),

    /// Index out of bounds, or a non-representable number
    #[error("{0}")]
    Range(String),

    /// An action needing a table-bound receiver got something else
    #[error("{0}")]
    Selection(String),

    /// Primary key constraint violated
    #[error("{0}")]
    Identity(String),

    #[error("Table `{0}` does not exist")]
    TableNotFound(String),

    #[error("Table `{0}` already exists")]
    TableExists(String),

    #[error("Unknown action `{0}`")]
    UnknownAction(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Invalid fixture: {0}")]
    Fixture(String),
}

/// Coarse category of a [`QueryError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Arity,
    Type,
    Range,
    Selection,
    Identity,
    Store,
    Parse,
    Evaluation,
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::Arity(_) => ErrorKind::Arity,
            QueryError::Type(_) => ErrorKind::Type,
            QueryError::Range(_) => ErrorKind::Range,
            QueryError::Selection(_) => ErrorKind::Selection,
            QueryError::Identity(_) => ErrorKind::Identity,
            QueryError::TableNotFound(_)
            | QueryError::TableExists(_)
            | QueryError::Fixture(_) => ErrorKind::Store,
            QueryError::Parse(_) => ErrorKind::Parse,
            QueryError::UnknownAction(_) | QueryError::Evaluation(_) => ErrorKind::Evaluation,
        }
    }
}

/// Result type for query operations
pub type Result<T> = std::result::Result<T, QueryError>;
