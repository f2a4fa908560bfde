use std::io::{self, Write};

use anyhow::Result;
use colored::{ColoredString, Colorize};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};

use crate::shell::{Action, Dialogs, Form, Severity};

/// Prompt-driven front end for the shell
#[derive(Default)]
pub struct TerminalUi;

impl TerminalUi {
    pub fn new() -> Self {
        Self
    }
}

/// Esc / Ctrl-C on a prompt
fn cancelled<T>(result: Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Dialogs for TerminalUi {
    fn choose_action(&mut self, form: &Form) -> Result<Action> {
        render_form(form);
        let action = Select::new("Action:", Action::ALL.to_vec())
            .with_starting_cursor(2)
            .prompt();
        Ok(cancelled(action)?.unwrap_or(Action::Quit))
    }

    fn message(&mut self, severity: Severity, title: &str, text: &str) {
        let tag = match severity {
            Severity::Info => "[SUCCESS]".green(),
            Severity::Warning => "[WARNING]".yellow(),
            Severity::Error => "[ERROR]".red(),
        };
        println!();
        println!("{} {}: {}", tag, title.bold(), text);
    }

    fn ask_secret(&mut self, _title: &str, prompt: &str) -> Result<Option<String>> {
        cancelled(
            Password::new(prompt)
                .without_confirmation()
                .with_display_mode(PasswordDisplayMode::Masked)
                .prompt(),
        )
    }

    fn ask_url(&mut self, current: &str) -> Result<Option<String>> {
        cancelled(
            Text::new("URL:")
                .with_initial_value(current)
                .with_placeholder("https://example.com/login")
                .prompt(),
        )
    }

    fn set_busy(&mut self, busy: bool) {
        if busy {
            print!("{} Verifying API key...", "[INFO]".blue());
            let _ = io::stdout().flush();
        } else {
            println!();
        }
    }
}

fn verdict_colored(verdict: &str) -> ColoredString {
    match verdict {
        "phishing" => verdict.red().bold(),
        "normal" => verdict.green().bold(),
        "unknown" => verdict.yellow().bold(),
        "error" => verdict.red(),
        _ => verdict.normal(),
    }
}

/// Result panel, shared by the interactive form and one-shot mode
pub fn render_result(form: &Form) {
    println!("URL:        {}", form.url);
    println!("Verdict:    {}", verdict_colored(&form.verdict));
    println!("Confidence: {}", form.confidence);
    println!("Rationale:  {}", form.rationale);
}

pub fn render_form(form: &Form) {
    println!();
    println!("{}", "=== Anti-Phish ===".bold().cyan());
    println!();
    render_result(form);
    println!();
}
