use anyhow::Result;
use colored::*;
use prettytable::{Cell, Row, Table};
use tabletop::core::types::type_of;
use tabletop::{ActionDescriptor, Value};
use crate::formatters::Formatter;

/// Longueur maximale d'une cellule avant troncature
const MAX_CELL: usize = 50;

/// Formateur au format tableau
pub struct TableFormatter {
    /// Indique si les couleurs sont activées
    colored: bool,
}

impl TableFormatter {
    /// Crée un nouveau formateur tableau
    pub fn new() -> Self {
        TableFormatter {
            colored: true,
        }
    }

    /// Désactive les couleurs
    pub fn without_colors() -> Self {
        TableFormatter {
            colored: false,
        }
    }
}

impl Formatter for TableFormatter {
    fn format_value(&self, value: &Value) -> Result<String> {
        match value {
            // Une liste de lignes s'affiche avec une colonne par champ
            Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
                Ok(rows_table(items).to_string())
            }
            Value::Array(items) => {
                let mut table = Table::new();
                table.set_titles(Row::new(vec![
                    Cell::new("Index"),
                    Cell::new("Type"),
                    Cell::new("Valeur"),
                ]));
                for (i, item) in items.iter().enumerate() {
                    table.add_row(Row::new(vec![
                        Cell::new(&i.to_string()),
                        Cell::new(type_of(item)),
                        Cell::new(&cell_text(item)),
                    ]));
                }
                Ok(table.to_string())
            }
            Value::Object(map) => {
                let mut table = Table::new();
                table.set_titles(Row::new(vec![
                    Cell::new("Clé"),
                    Cell::new("Type"),
                    Cell::new("Valeur"),
                ]));
                for (key, value) in map {
                    table.add_row(Row::new(vec![
                        Cell::new(key),
                        Cell::new(type_of(value)),
                        Cell::new(&cell_text(value)),
                    ]));
                }
                Ok(table.to_string())
            }
            scalar => {
                let mut table = Table::new();
                table.set_titles(Row::new(vec![Cell::new("Type"), Cell::new("Valeur")]));
                table.add_row(Row::new(vec![
                    Cell::new(type_of(scalar)),
                    Cell::new(&cell_text(scalar)),
                ]));
                Ok(table.to_string())
            }
        }
    }

    fn format_tables(&self, tables: &[(String, usize)]) -> Result<String> {
        let mut table = Table::new();
        table.set_titles(Row::new(vec![Cell::new("Table"), Cell::new("Lignes")]));
        for (name, rows) in tables {
            table.add_row(Row::new(vec![Cell::new(name), Cell::new(&rows.to_string())]));
        }
        Ok(table.to_string())
    }

    fn format_actions(&self, actions: &[(&str, ActionDescriptor)]) -> Result<String> {
        let mut table = Table::new();
        table.set_titles(Row::new(vec![
            Cell::new("Action"),
            Cell::new("Arité"),
            Cell::new("Type"),
        ]));
        for (id, descriptor) in actions {
            table.add_row(Row::new(vec![
                Cell::new(id),
                Cell::new(&descriptor.arity.to_string()),
                Cell::new(descriptor.ty.as_str()),
            ]));
        }
        Ok(table.to_string())
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

/// Tableau avec une colonne par champ, dans l'ordre de première apparition
fn rows_table(rows: &[Value]) -> Table {
    let mut columns: Vec<&String> = Vec::new();
    for row in rows {
        if let Some(object) = row.as_object() {
            for key in object.keys() {
                if !columns.contains(&key) {
                    columns.push(key);
                }
            }
        }
    }

    let mut table = Table::new();
    table.set_titles(Row::new(columns.iter().map(|column| Cell::new(column)).collect()));
    for row in rows {
        let cells = columns
            .iter()
            .map(|column| match row.get(column.as_str()) {
                Some(value) => Cell::new(&cell_text(value)),
                None => Cell::new(""),
            })
            .collect();
        table.add_row(Row::new(cells));
    }
    table
}

/// Convertit une valeur en texte de cellule
fn cell_text(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Array(_) => "[array]".to_string(),
        Value::Object(_) => "{object}".to_string(),
        other => other.to_string(),
    };

    // Tronquer les chaînes longues
    if text.chars().count() > MAX_CELL {
        let truncated: String = text.chars().take(MAX_CELL - 3).collect();
        format!("{}...", truncated)
    } else {
        text
    }
}
