//! In-memory store for Tabletop
//!
//! This module provides the only store implementation: named tables held
//! as ordered vectors of row objects.

use std::collections::HashMap;
use log::debug;
use serde_json::Value;
use crate::core::errors::{Result, QueryError};
use crate::core::store::Store;

/// An in-memory store for the database
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Map of table names to rows
    tables: HashMap<String, Vec<Value>>,
}

impl MemoryStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        MemoryStore {
            tables: HashMap::new(),
        }
    }

    /// Build a store from a fixture object `{ "<table>": [rows...] }`
    pub fn from_fixture(fixture: Value) -> Result<Self> {
        let mut store = MemoryStore::new();
        store.load_fixture(fixture)?;
        Ok(store)
    }

    /// Load every table of a fixture object, replacing same-named tables
    pub fn load_fixture(&mut self, fixture: Value) -> Result<()> {
        let tables = match fixture {
            Value::Object(tables) => tables,
            other => return Err(QueryError::Fixture(format!(
                "expected an object of tables, found {}",
                crate::core::types::type_of(&other)
            ))),
        };

        for (name, rows) in tables {
            let rows = match rows {
                Value::Array(rows) => rows,
                _ => return Err(QueryError::Fixture(format!("table `{}` is not an array", name))),
            };
            if rows.iter().any(|row| !row.is_object()) {
                return Err(QueryError::Fixture(format!("table `{}` contains a non-object row", name)));
            }
            self.load_table(&name, rows)?;
        }

        Ok(())
    }
}

impl Store for MemoryStore {
    fn table(&self, name: &str) -> Result<&Vec<Value>> {
        self.tables
            .get(name)
            .ok_or_else(|| QueryError::TableNotFound(name.to_string()))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Vec<Value>> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| QueryError::TableNotFound(name.to_string()))
    }

    fn create_table(&mut self, name: &str) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(QueryError::TableExists(name.to_string()));
        }

        debug!("Creating table `{}`", name);
        self.tables.insert(name.to_string(), Vec::new());
        Ok(())
    }

    fn drop_table(&mut self, name: &str) -> Result<()> {
        if self.tables.remove(name).is_none() {
            return Err(QueryError::TableNotFound(name.to_string()));
        }

        debug!("Dropped table `{}`", name);
        Ok(())
    }

    fn load_table(&mut self, name: &str, rows: Vec<Value>) -> Result<()> {
        debug!("Loading {} rows into `{}`", rows.len(), name);
        self.tables.insert(name.to_string(), rows);
        Ok(())
    }

    fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    fn clear(&mut self) {
        self.tables.clear();
    }
}
