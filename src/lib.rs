//! Tabletop: an in-memory query evaluator
//!
//! This crate evaluates chained, RethinkDB-style queries (field access,
//! arithmetic, object shaping, table mutation) against tables of JSON rows
//! held entirely in memory.

// Exporter les modules
pub mod core;
pub mod storage;
pub mod actions;
pub mod ql;

use std::fs;
use std::path::Path;

use log::info;
use crate::core::store::Store;
use crate::storage::MemoryStore;

/// Main API for Tabletop
pub struct Database {
    store: Box<dyn Store>,
}

impl Database {
    /// Create a new, empty in-memory database
    pub fn new_in_memory() -> Self {
        Database {
            store: Box::new(MemoryStore::new()),
        }
    }

    /// Create a database from a fixture object `{ "<table>": [rows...] }`
    pub fn from_fixture(fixture: Value) -> Result<Self> {
        Ok(Database {
            store: Box::new(MemoryStore::from_fixture(fixture)?),
        })
    }

    /// Create a database from a JSON fixture file
    pub fn open_fixture<P: AsRef<Path>>(path: P) -> Result<Self> {
        Database::from_fixture(read_fixture(path)?)
    }

    /// Replace every table with the contents of a fixture.
    ///
    /// The current tables are kept if the fixture is malformed.
    pub fn init(&mut self, fixture: Value) -> Result<()> {
        let store = MemoryStore::from_fixture(fixture)?;
        info!("Loaded {} table(s)", store.table_names().len());
        self.store = Box::new(store);
        Ok(())
    }

    /// Parse and run a query
    pub fn run(&mut self, query: &str) -> Result<Value> {
        ql::execute_query(self.store.as_mut(), query)
    }

    /// Run an already parsed query
    pub fn run_term(&mut self, term: &Term) -> Result<Value> {
        ql::execute_term(self.store.as_mut(), term)
    }

    /// Rows of a table
    pub fn table(&self, name: &str) -> Result<&Vec<Value>> {
        self.store.table(name)
    }

    /// Names of every table, sorted
    pub fn table_names(&self) -> Vec<String> {
        self.store.table_names()
    }

    pub fn create_table(&mut self, name: &str) -> Result<()> {
        self.store.create_table(name)
    }

    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.store.drop_table(name)
    }
}

impl Default for Database {
    fn default() -> Self {
        Database::new_in_memory()
    }
}

/// Read a JSON fixture file
pub fn read_fixture<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| QueryError::Fixture(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&text)
        .map_err(|e| QueryError::Fixture(format!("{} is not valid JSON: {}", path.display(), e)))
}

// Ré-exporter les types principaux pour faciliter l'utilisation
pub use serde_json::Value;
pub use crate::core::errors::{ErrorKind, QueryError, Result};
pub use crate::core::types::TypeTag;
pub use crate::core::report::MutationReport;
pub use crate::actions::{describe, invoke, ActionDescriptor, Argument, Deferred};
pub use crate::actions::arity::Arity;
pub use crate::ql::Term;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_open_fixture() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"users": [{{"id": 1, "name": "Alec"}}]}}"#).unwrap();

        let mut db = Database::open_fixture(file.path()).unwrap();
        assert_eq!(db.table_names(), vec!["users"]);
        assert_eq!(db.run(r#"r.table("users").get(1)("name")"#).unwrap(), json!("Alec"));
    }

    #[test]
    fn test_open_fixture_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(Database::open_fixture(file.path()), Err(QueryError::Fixture(_))));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(Database::open_fixture(missing), Err(QueryError::Fixture(_))));
    }

    #[test]
    fn test_init_replaces_tables() {
        let mut db = Database::from_fixture(json!({"a": [], "b": []})).unwrap();
        db.init(json!({"c": [{"id": 1}]})).unwrap();
        assert_eq!(db.table_names(), vec!["c"]);

        assert!(db.init(json!({"d": 5})).is_err());
        assert_eq!(db.table_names(), vec!["c"]);
    }

    #[test]
    fn test_table_management() {
        let mut db = Database::new_in_memory();
        db.create_table("users").unwrap();
        db.run(r#"r.table("users").insert({id: 1})"#).unwrap();
        assert_eq!(db.table("users").unwrap().len(), 1);
        db.drop_table("users").unwrap();
        assert!(matches!(db.run(r#"r.table("users")"#), Err(QueryError::TableNotFound(_))));
    }
}
