use serde_json::Value;

use crate::core::errors::Result;

/// Trait defining the table namespace the actions operate on
pub trait Store: Send + Sync {
    /// Rows of a table, in insertion order
    fn table(&self, name: &str) -> Result<&Vec<Value>>;

    /// Mutable rows of a table
    fn table_mut(&mut self, name: &str) -> Result<&mut Vec<Value>>;

    /// Create an empty table
    fn create_table(&mut self, name: &str) -> Result<()>;

    /// Drop a table and all of its rows
    fn drop_table(&mut self, name: &str) -> Result<()>;

    /// Replace the contents of a table, creating it when missing
    fn load_table(&mut self, name: &str, rows: Vec<Value>) -> Result<()>;

    /// Names of every table, sorted
    fn table_names(&self) -> Vec<String>;

    /// Drop every table
    fn clear(&mut self);
}
