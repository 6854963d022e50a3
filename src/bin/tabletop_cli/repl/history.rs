use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use anyhow::Result;

/// Structure pour gérer l'historique des commandes
pub struct History {
    /// Chemin du fichier d'historique
    file_path: PathBuf,

    /// Commandes en mémoire
    commands: Vec<String>,

    /// Taille maximale de l'historique
    max_size: usize,
}

impl History {
    /// Crée un nouvel historique
    pub fn new<P: AsRef<Path>>(file_path: P, max_size: usize) -> Self {
        History {
            file_path: file_path.as_ref().to_path_buf(),
            commands: Vec::new(),
            max_size,
        }
    }

    /// Charge l'historique depuis un fichier; un fichier absent donne un historique vide
    pub fn load(&mut self) -> Result<()> {
        let text = match fs::read_to_string(&self.file_path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        self.commands = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        self.truncate();
        Ok(())
    }

    /// Écrit l'historique, une commande par ligne
    pub fn save(&self) -> Result<()> {
        let mut text = self.commands.join("\n");
        text.push('\n');
        fs::write(&self.file_path, text)?;
        Ok(())
    }

    /// Ne garde que les `max_size` commandes les plus récentes
    fn truncate(&mut self) {
        let excess = self.commands.len().saturating_sub(self.max_size);
        self.commands.drain(..excess);
    }

    /// Ajoute une commande à l'historique
    pub fn add(&mut self, command: &str) {
        // Ignorer les commandes vides
        let command = command.trim();
        if command.is_empty() {
            return;
        }

        // Une commande répétée n'est gardée qu'une fois
        if self.commands.last().map(String::as_str) == Some(command) {
            return;
        }

        self.commands.push(command.to_string());
        self.truncate();
    }

    /// Récupère toutes les commandes
    pub fn get_all(&self) -> &[String] {
        &self.commands
    }

    /// Recherche des commandes correspondant à un motif
    pub fn search(&self, pattern: &str) -> Vec<String> {
        self.commands
            .iter()
            .filter(|cmd| cmd.contains(pattern))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_skips_blank_and_repeated() {
        let mut history = History::new("unused", 10);
        history.add("r.table('users')");
        history.add("   ");
        history.add("r.table('users')");
        history.add(".tables");
        assert_eq!(history.get_all(), &["r.table('users')".to_string(), ".tables".to_string()]);
        assert_eq!(history.search("table(").len(), 1);
    }

    #[test]
    fn test_save_and_load_keep_the_newest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");

        let mut history = History::new(&path, 10);
        for i in 0..5 {
            history.add(&format!("r.expr({})", i));
        }
        history.save().unwrap();

        let mut reloaded = History::new(&path, 3);
        reloaded.load().unwrap();
        assert_eq!(reloaded.get_all(), &["r.expr(2)", "r.expr(3)", "r.expr(4)"]);
    }
}
