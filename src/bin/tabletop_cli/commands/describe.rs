use anyhow::Result;
use tabletop::actions::registry;
use crate::context::Context;

/// Exécute la commande de description des actions
pub fn execute(context: &Context, action: Option<&str>) -> Result<()> {
    let registry = registry();

    // Une seule action, ou toutes par ordre alphabétique
    let ids = match action {
        Some(id) => vec![id],
        None => registry.action_ids(),
    };

    let mut actions = Vec::with_capacity(ids.len());
    for id in ids {
        actions.push((id, *registry.describe(id)?));
    }

    println!("{}", context.formatter().format_actions(&actions)?);
    Ok(())
}
