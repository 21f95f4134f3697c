//! Configuration loading.
//!
//! Settings are layered: built-in defaults, then a TOML file, then environment
//! variables and command-line flags (applied by [`crate::cli`]).

use crate::error::ConfigError;
use crate::search::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "docsearch.toml";

/// Directory name used under the platform config and cache directories.
pub const APP_DIR: &str = "docsearch-mcp";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Search index to open on startup
    pub index: Option<PathBuf>,
    /// Stemming and stop-word language for ranked search
    pub language: Language,
    /// Results returned when a request does not specify a limit
    pub default_limit: usize,
    /// Upper bound applied to any requested limit
    pub max_limit: usize,
    pub cache: CacheConfig,
    pub log: LogConfig,
    /// File the settings were read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index: None,
            language: Language::default(),
            default_limit: 10,
            max_limit: 100,
            cache: CacheConfig::default(),
            log: LogConfig::default(),
            source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Persist ranked indexes between runs
    pub enabled: bool,
    /// Defaults to `<platform cache dir>/docsearch-mcp`
    pub dir: Option<PathBuf>,
    /// Loaded indexes kept in memory
    pub lru_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            lru_capacity: 8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl Config {
    /// Parse a TOML document. `path` is only used for error messages.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit file, or from the first discovered file, or defaults.
    ///
    /// An explicit path must exist; discovered locations are optional. Nothing is
    /// logged here since tracing is configured from the result; the file used is
    /// recorded in [`source`](Self::source) instead.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::discover_file() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        let mut config = Self::from_toml_str(&content, &path)?;
        config.resolve_relative_paths(&path);
        config.source = Some(path);
        Ok(config)
    }

    /// `./docsearch.toml`, then `<config dir>/docsearch-mcp/config.toml`.
    pub fn discover_file() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_limit == 0 {
            return Err(ConfigError::Invalid(
                "default_limit must be at least 1".to_string(),
            ));
        }
        if self.default_limit > self.max_limit {
            return Err(ConfigError::Invalid(format!(
                "default_limit ({}) exceeds max_limit ({})",
                self.default_limit, self.max_limit
            )));
        }
        if self.cache.lru_capacity == 0 {
            return Err(ConfigError::Invalid(
                "cache.lru_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory for persisted ranked indexes, or `None` when caching is off.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        if !self.cache.enabled {
            return None;
        }
        self.cache
            .dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join(APP_DIR)))
    }

    /// Effective result count for a request.
    pub fn limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }

    /// Paths in a config file are relative to the file, not the working directory.
    fn resolve_relative_paths(&mut self, config_path: &Path) {
        let Some(base) = config_path.parent() else {
            return;
        };
        for path in [self.index.as_mut(), self.cache.dir.as_mut()]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        check!(config.default_limit == 10);
        check!(config.max_limit == 100);
        check!(config.cache.enabled);
        check!(config.language == Language::English);
        check!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_file() {
        let toml = r#"
            index = "docs/build/search_index.js"
            language = "german"
            default_limit = 5
            max_limit = 20

            [cache]
            enabled = false
            lru_capacity = 2

            [log]
            format = "json"
        "#;
        let config = Config::from_toml_str(toml, Path::new("docsearch.toml")).unwrap();
        check!(config.index == Some(PathBuf::from("docs/build/search_index.js")));
        check!(config.language == Language::German);
        check!(config.default_limit == 5);
        check!(!config.cache.enabled);
        check!(config.cache.lru_capacity == 2);
        check!(config.log.format == LogFormat::Json);
        check!(config.cache_dir().is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str("language = \"none\"", Path::new("x.toml")).unwrap();
        check!(config.language == Language::None);
        check!(config.default_limit == 10);
        check!(config.cache.enabled);
    }

    #[rstest]
    #[case("unknown_key = 1")]
    #[case("[cache]\nsize = 3")]
    #[case("language = \"klingon\"")]
    fn test_rejects_bad_toml(#[case] toml: &str) {
        let_assert!(Err(ConfigError::Toml { .. }) = Config::from_toml_str(toml, Path::new("x.toml")));
    }

    #[rstest]
    #[case("default_limit = 0")]
    #[case("default_limit = 50\nmax_limit = 10")]
    #[case("[cache]\nlru_capacity = 0")]
    fn test_rejects_inconsistent_values(#[case] toml: &str) {
        let_assert!(
            Err(ConfigError::Invalid(_)) = Config::from_toml_str(toml, Path::new("x.toml"))
        );
    }

    #[rstest]
    #[case(None, 10)]
    #[case(Some(3), 3)]
    #[case(Some(0), 1)]
    #[case(Some(1000), 100)]
    fn test_limit_clamping(#[case] requested: Option<usize>, #[case] expected: usize) {
        check!(Config::default().limit(requested) == expected);
    }

    #[test]
    fn test_load_resolves_paths_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docsearch.toml");
        std::fs::write(&path, "index = \"build/search_index.js\"\n[cache]\ndir = \"/abs/cache\"\n")
            .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        check!(config.index == Some(dir.path().join("build/search_index.js")));
        check!(config.cache.dir == Some(PathBuf::from("/abs/cache")));
        check!(config.cache_dir() == Some(PathBuf::from("/abs/cache")));
    }

    #[test]
    fn test_load_records_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docsearch.toml");
        std::fs::write(&path, "default_limit = 5\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        check!(config.source == Some(path));
        check!(config.default_limit == 5);
        check!(Config::default().source.is_none());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let_assert!(Err(ConfigError::Io { .. }) = Config::load(Some(&dir.path().join("nope.toml"))));
    }
}
