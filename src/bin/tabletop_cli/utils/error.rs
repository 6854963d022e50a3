use thiserror::Error;
use tabletop::QueryError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Erreur de requête: {0}")]
    Query(#[from] QueryError),

    #[error("Erreur d'entrée/sortie: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format inconnu: {0}")]
    UnknownFormat(String),

    #[error("Commande inconnue: {0}")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(String),
}
