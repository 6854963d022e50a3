use anyhow::Result;
use serde_json::json;
use tabletop::{ActionDescriptor, Value};
use crate::formatters::Formatter;

/// Formateur au format JSON
pub struct JsonFormatter {
    /// Indique si l'indentation est activée
    pretty: bool,
}

impl JsonFormatter {
    /// Crée un nouveau formateur JSON
    pub fn new() -> Self {
        JsonFormatter {
            pretty: true,
        }
    }

    /// Désactive l'indentation
    pub fn without_pretty() -> Self {
        JsonFormatter {
            pretty: false,
        }
    }

    fn render(&self, value: &Value) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }

    /// Enveloppe un message dans un objet `{ key: message }`
    fn message(&self, key: &str, message: &str) -> String {
        let value = json!({ key: message });
        self.render(&value)
            .unwrap_or_else(|_| format!("{{\"{}\":{:?}}}", key, message))
    }
}

impl Formatter for JsonFormatter {
    fn format_value(&self, value: &Value) -> Result<String> {
        self.render(value)
    }

    fn format_tables(&self, tables: &[(String, usize)]) -> Result<String> {
        let value: serde_json::Map<String, Value> = tables
            .iter()
            .map(|(name, rows)| (name.clone(), json!(rows)))
            .collect();
        self.render(&Value::Object(value))
    }

    fn format_actions(&self, actions: &[(&str, ActionDescriptor)]) -> Result<String> {
        let value: Vec<Value> = actions
            .iter()
            .map(|(id, descriptor)| {
                json!({
                    "id": id,
                    "arity": descriptor.arity,
                    "type": descriptor.ty,
                })
            })
            .collect();
        self.render(&Value::Array(value))
    }

    fn format_error(&self, error: &str) -> String {
        self.message("error", error)
    }

    fn format_info(&self, info: &str) -> String {
        self.message("info", info)
    }

    fn format_success(&self, success: &str) -> String {
        self.message("success", success)
    }
}
