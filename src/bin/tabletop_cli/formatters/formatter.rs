use anyhow::Result;
use tabletop::{ActionDescriptor, Value};

/// Trait définissant un formateur de sortie
pub trait Formatter {
    /// Formate le résultat d'une requête pour l'affichage
    fn format_value(&self, value: &Value) -> Result<String>;

    /// Formate la liste des tables avec leur nombre de lignes
    fn format_tables(&self, tables: &[(String, usize)]) -> Result<String>;

    /// Formate la description d'une ou plusieurs actions
    fn format_actions(&self, actions: &[(&str, ActionDescriptor)]) -> Result<String>;

    /// Formate un message d'erreur
    fn format_error(&self, error: &str) -> String;

    /// Formate un message d'information
    fn format_info(&self, info: &str) -> String;

    /// Formate un message de succès
    fn format_success(&self, success: &str) -> String;
}
