use std::path::Path;
use anyhow::Result;
use log::info;
use tabletop::Database;
use crate::formatters::{Formatter, OutputFormat};
use crate::formatters::text::TextFormatter;
use crate::formatters::json::JsonFormatter;
use crate::formatters::table::TableFormatter;

/// Contexte d'exécution du CLI
pub struct Context {
    /// Base de données en mémoire
    db: Database,

    /// Format de sortie
    format: OutputFormat,

    /// Sortie sans couleurs ni indentation
    plain: bool,

    /// Formateur actuel
    formatter: Box<dyn Formatter>,
}

impl Context {
    /// Crée un nouveau contexte, en chargeant éventuellement un fichier de tables
    pub fn new(format: OutputFormat, plain: bool, data: Option<&Path>) -> Result<Self> {
        let db = match data {
            Some(path) => {
                info!("Chargement des tables depuis {}", path.display());
                Database::open_fixture(path)?
            }
            None => Database::new_in_memory(),
        };

        Ok(Context {
            db,
            format,
            plain,
            formatter: formatter_for(format, plain),
        })
    }

    /// Obtient une référence à la base de données
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Obtient une référence mutable à la base de données
    pub fn db_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Obtient le formateur actuel
    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    /// Définit le format de sortie
    pub fn set_format(&mut self, format: OutputFormat) {
        if format != self.format {
            self.format = format;
            self.formatter = formatter_for(format, self.plain);
        }
    }
}

fn formatter_for(format: OutputFormat, plain: bool) -> Box<dyn Formatter> {
    match (format, plain) {
        (OutputFormat::Text, false) => Box::new(TextFormatter::new()),
        (OutputFormat::Text, true) => Box::new(TextFormatter::without_colors()),
        (OutputFormat::Json, false) => Box::new(JsonFormatter::new()),
        (OutputFormat::Json, true) => Box::new(JsonFormatter::without_pretty()),
        (OutputFormat::Table, false) => Box::new(TableFormatter::new()),
        (OutputFormat::Table, true) => Box::new(TableFormatter::without_colors()),
    }
}
