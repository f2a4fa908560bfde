use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

pub mod commands;
pub mod ui;

use crate::client::openai::{OpenAiBackend, DEFAULT_API_BASE};
use crate::client::Classifier;
use crate::store::local::LocalConfig;

#[derive(Parser)]
#[command(name = "antiphish")]
#[command(about = "Ask an LLM whether a URL is phishing")]
#[command(version)]
pub struct Cli {
    /// Configuration file holding the API key [default: config.json beside the executable]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, global = true, value_name = "URL", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a single URL with the saved API key and exit
    Analyze {
        /// URL to classify
        url: String,
    },
}

/// Settings resolved from the command line
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config_path: Option<PathBuf>,
    pub api_base: String,
}

impl AppConfig {
    pub fn store(&self) -> Result<LocalConfig> {
        match &self.config_path {
            Some(path) => Ok(LocalConfig::new(path.clone())),
            None => LocalConfig::beside_executable(),
        }
    }

    pub fn classifier(&self) -> Result<Classifier<OpenAiBackend>> {
        let backend = OpenAiBackend::new(self.api_base.as_str())
            .context("Failed to initialise the HTTP client")?;
        Ok(Classifier::new(backend))
    }
}

impl Cli {
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            config_path: self.config.clone(),
            api_base: self.api_base.clone(),
        }
    }

    pub fn run(self) -> Result<()> {
        let config = self.app_config();
        let store = config.store()?;
        let classifier = config.classifier()?;

        match self.command {
            None => commands::interactive::handle(classifier, store),
            Some(Commands::Analyze { url }) => commands::analyze::handle(classifier, store, &url),
        }
    }
}
