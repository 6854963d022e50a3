pub mod formatter;
pub mod text;
pub mod json;
pub mod table;

pub use formatter::Formatter;
use clap::ValueEnum;
use crate::utils::error::CliError;

/// Formats de sortie disponibles
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Format texte
    Text,

    /// Format JSON
    Json,

    /// Format tableau
    Table,
}

impl OutputFormat {
    /// Analyse un nom de format saisi dans le REPL
    pub fn parse(name: &str) -> Result<Self, CliError> {
        match name {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            other => Err(CliError::UnknownFormat(other.to_string())),
        }
    }
}
