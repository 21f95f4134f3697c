//! Error handling types and utilities.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for docsearch-mcp application code.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods at the CLI and server layers.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when loading a search index fails.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The index file could not be read.
    #[error("Failed to read search index at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The script did not have the expected `var name = {...}` / `{...}` / `[...]` shape.
    #[error("Unrecognised search index layout: {0}")]
    Layout(String),

    /// The record data was malformed or truncated.
    #[error("Failed to parse search index at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// Two records share the same location.
    #[error("Duplicate location '{location}' (entries {first} and {second})")]
    DuplicateLocation {
        location: String,
        first: usize,
        second: usize,
    },
}

impl LoadError {
    /// Build a parse error from serde_json, translating its position back to the
    /// original input when the payload was extracted from a larger script.
    pub(crate) fn from_json(error: &serde_json::Error, line_offset: usize) -> Self {
        Self::Parse {
            line: error.line() + line_offset,
            column: error.column(),
            message: error.to_string(),
        }
    }
}

/// Error returned when configuration cannot be loaded or is inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
