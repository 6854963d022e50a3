mod app;
mod context;
mod commands;
mod formatters;
mod repl;
mod utils;

use anyhow::Result;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    let cli = app::Cli::parse();

    // Initialiser le logger; RUST_LOG reste prioritaire sur -v
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    info!("Démarrage de l'application Tabletop CLI");

    // Exécuter l'application
    let result = app::run(cli);

    info!("Fin de l'application Tabletop CLI");

    result
}
