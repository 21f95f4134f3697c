use crate::config::{Config, LogFormat};
use crate::error::ConfigError;
use crate::search::Language;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "docsearch-mcp", version)]
#[command(about = "Search Documenter documentation indexes from the shell or over MCP", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./docsearch.toml, then the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Search index to load (search_index.js)
    #[arg(long, global = true, env = "DOCSEARCH_INDEX", value_name = "FILE")]
    pub index: Option<PathBuf>,

    /// Language for stemming and stop words in ranked search
    #[arg(long, global = true, env = "DOCSEARCH_LANGUAGE", value_enum)]
    pub language: Option<Language>,

    /// Log output format
    #[arg(long, global = true, env = "DOCSEARCH_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the MCP tools over stdio (default)
    Serve,
    /// Search the index and print matching entries
    Search {
        query: String,
        /// Rank by TF-IDF relevance instead of substring matching
        #[arg(long)]
        ranked: bool,
        /// Only entries of this category (page, section, Type, Function, Method)
        #[arg(short = 'k', long = "category")]
        category: Option<String>,
        /// Only entries on this page
        #[arg(short, long)]
        page: Option<String>,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the pages in the index
    Pages,
    /// Load and validate the index, reporting entry counts
    Check,
}

impl Cli {
    /// Load the configuration file and apply environment and command-line overrides.
    pub fn resolve_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(index) = &self.index {
            config.index = Some(index.clone());
        }
        if let Some(language) = self.language {
            config.language = language;
        }
        if let Some(format) = self.log_format {
            config.log.format = format;
        }
    }

    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}
