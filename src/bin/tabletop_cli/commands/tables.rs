use anyhow::Result;
use crate::context::Context;

/// Exécute la commande de listage des tables
pub fn execute(context: &Context) -> Result<()> {
    let db = context.db();

    // Associer chaque table à son nombre de lignes
    let mut tables = Vec::new();
    for name in db.table_names() {
        let rows = db.table(&name)?.len();
        tables.push((name, rows));
    }

    if tables.is_empty() {
        println!("{}", context.formatter().format_info("Aucune table chargée"));
        return Ok(());
    }

    println!("{}", context.formatter().format_tables(&tables)?);
    Ok(())
}
