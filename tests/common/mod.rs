//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! Every test that touches [`IndexState`] gets its own temporary directory:
//! - a copy of the fixture index, so canonical paths never collide across tests
//! - a private term cache directory (cold cache state)
//! - an empty in-memory LRU of loaded indexes
//!
//! # Available Fixtures
//!
//! - `fixture_index`: The parsed fixture, for tests of the pure search layer
//! - `empty_state`: An `IndexState` with no index configured
//!
//! Async tests that need the fixture active call `IsolatedState::active().await`.

use docsearch_mcp::{Config, IndexState, SearchIndex, loader};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Entries in `tests/fixtures/search_index.js`.
#[allow(dead_code)] // Used across different integration test crates
pub const FIXTURE_ENTRIES: usize = 60;

/// Returns the project root directory (where Cargo.toml lives).
pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// The Documenter search index every integration test runs against.
pub fn fixture_path() -> PathBuf {
    project_root().join("tests/fixtures/search_index.js")
}

/// A temporary directory for test isolation.
///
/// Cleaned up automatically when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file with the given content, creating parent directories.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
        full_path
    }

    /// Copies a file from the real filesystem into this workspace.
    ///
    /// # Panics
    /// Panics if copying fails.
    pub fn copy_file(&self, source: &Path, dest_relative: &str) -> PathBuf {
        let dest = self.root.join(dest_relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!(
                    "Failed to create parent directory for '{}': {}",
                    dest_relative, e
                )
            });
        }
        std::fs::copy(source, &dest).unwrap_or_else(|e| {
            panic!(
                "Failed to copy '{}' to '{}': {}",
                source.display(),
                dest_relative,
                e
            )
        });
        dest
    }

    /// Configuration whose term cache lives inside this workspace.
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.cache.dir = Some(self.root.join("cache"));
        config
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// An `IndexState` plus the temp directory backing it.
///
/// The directory must outlive the state, so tests hold on to the whole struct
/// and use `.state` for the tool handlers.
#[allow(dead_code)] // Fields used across different integration test crates
pub struct IsolatedState {
    pub workspace: TempWorkspace,
    pub state: Arc<IndexState>,
    /// Path of the copied fixture index
    pub index_path: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl IsolatedState {
    /// A state with no active index.
    pub fn empty() -> Self {
        let workspace = TempWorkspace::new();
        let index_path = workspace.copy_file(&fixture_path(), "docs/build/search_index.js");
        let state = Arc::new(IndexState::new(workspace.config()));
        Self {
            workspace,
            state,
            index_path,
        }
    }

    /// A state with the fixture index active.
    pub async fn active() -> Self {
        let isolated = Self::empty();
        isolated
            .state
            .set_active(&isolated.index_path)
            .await
            .expect("Failed to activate fixture index");
        isolated
    }
}

/// The parsed fixture index.
#[fixture]
pub fn fixture_index() -> SearchIndex {
    loader::load_path(&fixture_path()).expect("Fixture index should load")
}

/// An isolated state with nothing configured.
#[fixture]
pub fn empty_state() -> IsolatedState {
    IsolatedState::empty()
}
