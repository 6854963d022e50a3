mod history;

use std::path::Path;
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use crate::context::Context;
use crate::commands;
use crate::formatters::OutputFormat;
use crate::utils::error::CliError;
use self::history::History;

/// Fichier d'historique du REPL
const HISTORY_FILE: &str = "tabletop_history.txt";

/// Mode interactif (REPL)
pub struct Repl {
    /// Contexte d'exécution
    context: Context,

    /// Éditeur de ligne
    editor: DefaultEditor,

    /// Historique personnalisé
    history: History,
}

impl Repl {
    /// Crée un nouveau REPL
    pub fn new(context: Context) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        // Charger l'historique s'il existe
        let mut history = History::new(HISTORY_FILE, 1000);
        if let Err(e) = history.load() {
            log::warn!("Impossible de charger l'historique: {}", e);
        }

        for cmd in history.get_all() {
            let _ = editor.add_history_entry(cmd.as_str());
        }

        Ok(Repl {
            context,
            editor,
            history,
        })
    }

    /// Exécute le REPL
    pub fn run(&mut self) -> Result<()> {
        println!("{}", self.context.formatter().format_info("Tabletop CLI - Mode interactif"));
        println!("{}", self.context.formatter().format_info("Tapez .help pour l'aide ou .exit pour quitter"));

        loop {
            match self.editor.readline("tabletop> ") {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());
                    self.history.add(&line);

                    match self.process_line(line.trim()) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => println!("{}", self.context.formatter().format_error(&e.to_string())),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl-C
                    println!("Interruption (Ctrl-C)");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl-D
                    println!("Fin de l'entrée (Ctrl-D)");
                    break;
                }
                Err(err) => {
                    println!("{}", self.context.formatter().format_error(&format!("Erreur: {}", err)));
                    break;
                }
            }
        }

        self.history.save()
    }

    /// Traite une ligne; renvoie `false` pour quitter
    fn process_line(&mut self, line: &str) -> Result<bool> {
        if line.is_empty() {
            return Ok(true);
        }

        if let Some(cmd) = line.strip_prefix('.') {
            return self.process_special_command(cmd);
        }

        // Toute autre entrée est une requête
        commands::query::execute(&mut self.context, line)?;
        Ok(true)
    }

    /// Traite les commandes spéciales (commençant par '.')
    fn process_special_command(&mut self, cmd: &str) -> Result<bool> {
        let parts: Vec<&str> = cmd.split_whitespace().collect();
        let Some(name) = parts.first() else {
            return Err(CliError::UnknownCommand(cmd.to_string()).into());
        };

        match *name {
            "help" => self.print_help(),
            "exit" | "quit" => {
                println!("Au revoir !");
                return Ok(false);
            }
            "tables" => commands::tables::execute(&self.context)?,
            "describe" => commands::describe::execute(&self.context, parts.get(1).copied())?,
            "load" => {
                let file = parts
                    .get(1)
                    .ok_or_else(|| CliError::Usage(".load <fichier>".to_string()))?;
                commands::load::execute(&mut self.context, Path::new(file))?;
            }
            "format" => {
                let name = parts
                    .get(1)
                    .ok_or_else(|| CliError::Usage(".format <text|json|table>".to_string()))?;
                self.context.set_format(OutputFormat::parse(name)?);
                println!("{}", self.context.formatter().format_success(&format!("Format défini à {}", name)));
            }
            "history" => {
                let entries = match parts.get(1) {
                    Some(pattern) => self.history.search(pattern),
                    None => self.history.get_all().to_vec(),
                };

                if entries.is_empty() {
                    println!("Aucune commande dans l'historique.");
                } else {
                    for (i, cmd) in entries.iter().enumerate() {
                        println!("{}: {}", i + 1, cmd);
                    }
                }
            }
            _ => return Err(CliError::UnknownCommand(cmd.to_string()).into()),
        }

        Ok(true)
    }

    /// Affiche l'aide
    fn print_help(&self) {
        println!("Commandes disponibles:");
        println!("  .help                     Affiche cette aide");
        println!("  .exit, .quit              Quitte le CLI");
        println!("  .tables                   Liste les tables et leur nombre de lignes");
        println!("  .describe [action]        Décrit une action, ou toutes les actions");
        println!("  .load <fichier>           Remplace les tables par celles d'un fichier JSON");
        println!("  .format <text|json|table> Définit le format de sortie");
        println!("  .history [motif]          Affiche l'historique des commandes (filtré par motif optionnel)");
        println!();
        println!("Toute autre entrée est traitée comme une requête, par exemple:");
        println!("  r.table(\"users\").get(1).update({{age: 23}})");
    }
}
