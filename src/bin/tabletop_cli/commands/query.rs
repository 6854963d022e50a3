use anyhow::Result;
use crate::context::Context;
use crate::utils::error::CliError;

/// Exécute la commande d'exécution de requête
pub fn execute(context: &mut Context, query: &str) -> Result<()> {
    // Exécuter la requête
    let result = context.db_mut().run(query).map_err(CliError::from)?;

    // Formater et afficher le résultat
    let formatted = context.formatter().format_value(&result)?;
    println!("{}", formatted);

    Ok(())
}
