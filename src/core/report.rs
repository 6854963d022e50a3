//! Mutation reports
//!
//! Reports only carry the counters relevant to the branch taken, so every
//! field is optional and skipped when unset.

use serde::Serialize;
use serde_json::Value;
use super::errors::{QueryError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MutationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unchanged: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_keys: Option<Vec<Value>>,
}

impl MutationReport {
    /// `{deleted, skipped}`
    pub fn deleted(deleted: usize, skipped: usize) -> Self {
        MutationReport {
            deleted: Some(deleted),
            skipped: Some(skipped),
            ..Default::default()
        }
    }

    /// `{deleted}` for bulk deletes
    pub fn deleted_rows(deleted: usize) -> Self {
        MutationReport {
            deleted: Some(deleted),
            ..Default::default()
        }
    }

    /// `{replaced, unchanged}`
    pub fn updated(replaced: usize, unchanged: usize) -> Self {
        MutationReport {
            replaced: Some(replaced),
            unchanged: Some(unchanged),
            ..Default::default()
        }
    }

    /// `{replaced: 0, skipped: 1}` for a missing row
    pub fn skipped_update() -> Self {
        MutationReport {
            replaced: Some(0),
            skipped: Some(1),
            ..Default::default()
        }
    }

    /// Count a failed row, keeping the first message
    pub fn record_error(&mut self, message: &str) {
        *self.errors.get_or_insert(0) += 1;
        if self.first_error.is_none() {
            self.first_error = Some(message.to_string());
        }
    }

    pub fn into_value(self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| QueryError::Evaluation(e.to_string()))
    }
}
