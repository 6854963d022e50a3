use anyhow::Result;
use colored::*;
use tabletop::{ActionDescriptor, Value};
use crate::formatters::Formatter;

/// Formateur au format texte
pub struct TextFormatter {
    /// Indique si les couleurs sont activées
    colored: bool,
}

impl TextFormatter {
    /// Crée un nouveau formateur texte
    pub fn new() -> Self {
        TextFormatter {
            colored: true,
        }
    }

    /// Désactive les couleurs
    pub fn without_colors() -> Self {
        TextFormatter {
            colored: false,
        }
    }
}

impl Formatter for TextFormatter {
    fn format_value(&self, value: &Value) -> Result<String> {
        match value {
            Value::Null => Ok("null".to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(n.to_string()),
            Value::String(s) => Ok(format!("\"{}\"", s)),
            // Pour les structures complexes, utiliser l'indentation
            Value::Array(_) | Value::Object(_) => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_tables(&self, tables: &[(String, usize)]) -> Result<String> {
        let lines: Vec<String> = tables
            .iter()
            .map(|(name, rows)| {
                let name = if self.colored { name.bold().to_string() } else { name.clone() };
                format!("{} ({} ligne(s))", name, rows)
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn format_actions(&self, actions: &[(&str, ActionDescriptor)]) -> Result<String> {
        let lines: Vec<String> = actions
            .iter()
            .map(|(id, descriptor)| {
                let id = format!("{:<10}", id);
                let id = if self.colored { id.cyan().to_string() } else { id };
                format!("{} arité {:<6} type {}", id, descriptor.arity.to_string(), descriptor.ty)
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn format_error(&self, error: &str) -> String {
        if self.colored {
            format!("{}", error.red().bold())
        } else {
            format!("Erreur: {}", error)
        }
    }

    fn format_info(&self, info: &str) -> String {
        if self.colored {
            format!("{}", info.blue())
        } else {
            format!("Info: {}", info)
        }
    }

    fn format_success(&self, success: &str) -> String {
        if self.colored {
            format!("{}", success.green().bold())
        } else {
            format!("Succès: {}", success)
        }
    }
}
