use anyhow::Result;
use colored::Colorize;
use tracing::info;

use crate::cli::ui::TerminalUi;
use crate::client::{ChatBackend, Classifier};
use crate::shell::Shell;
use crate::store::CredentialStore;

pub fn handle(classifier: Classifier<impl ChatBackend>, store: impl CredentialStore) -> Result<()> {
    println!();
    println!("{}", "Anti-Phish-GPT".bold().cyan());
    println!("Config: {}", store.location().display().to_string().dimmed());

    let mut shell = Shell::new(classifier, store, TerminalUi::new());

    if shell.session().has_key() {
        println!("{} Using saved API key", "[INFO]".blue());
    } else {
        println!(
            "{} No API key configured. Choose 'Set API Key' first.",
            "[INFO]".blue()
        );
    }

    shell.run()?;
    info!("session closed");
    Ok(())
}
