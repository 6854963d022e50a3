use std::path::Path;
use anyhow::Result;
use tabletop::read_fixture;
use crate::context::Context;

/// Remplace toutes les tables par celles d'un fichier JSON
pub fn execute(context: &mut Context, path: &Path) -> Result<()> {
    let fixture = read_fixture(path)?;
    context.db_mut().init(fixture)?;

    let count = context.db().table_names().len();
    println!(
        "{}",
        context.formatter().format_success(&format!("{} table(s) chargée(s) depuis {}", count, path.display()))
    );
    Ok(())
}
