use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::context::Context;
use crate::formatters::OutputFormat;
use crate::repl::Repl;

#[derive(Parser)]
#[command(name = "tabletop")]
#[command(about = "CLI pour la base de données en mémoire Tabletop", long_about = None)]
pub struct Cli {
    /// Niveau de verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Format de sortie (text, json, table)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Sortie sans couleurs ni indentation
    #[arg(long)]
    pub plain: bool,

    /// Fichier JSON de tables à charger au démarrage
    #[arg(short, long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Commande à exécuter (mode interactif si absente)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Exécuter une requête
    Query {
        /// Requête à exécuter, par exemple r.table("users").get(1)
        query: String,
    },

    /// Lister les tables et leur nombre de lignes
    Tables,

    /// Décrire une action (arité et type déclaré), ou toutes les actions
    Describe {
        /// Identifiant de l'action
        action: Option<String>,
    },
}

/// Exécute l'application CLI
pub fn run(cli: Cli) -> Result<()> {
    // Créer un contexte
    let mut context = Context::new(cli.format, cli.plain, cli.data.as_deref())?;

    // Exécuter la commande spécifiée ou entrer en mode interactif
    match cli.command {
        Some(Commands::Query { query }) => commands::query::execute(&mut context, &query),
        Some(Commands::Tables) => commands::tables::execute(&context),
        Some(Commands::Describe { action }) => commands::describe::execute(&context, action.as_deref()),
        None => {
            let mut repl = Repl::new(context)?;
            repl.run()
        }
    }
}
