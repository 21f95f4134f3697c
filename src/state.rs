//! Shared session state: which index is active and which are loaded.

use crate::cache::TermCache;
use crate::config::Config;
use crate::index::SearchIndex;
use crate::loader;
use crate::search::{Language, RankedIndex};
use anyhow::{Context, Result};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;

/// A parsed index file plus its lazily built ranked index.
pub struct LoadedIndex {
    path: PathBuf,
    index: SearchIndex,
    language: Language,
    cache: Option<TermCache>,
    ranked: OnceLock<RankedIndex>,
}

impl std::fmt::Debug for LoadedIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedIndex")
            .field("path", &self.path)
            .field("entries", &self.index.len())
            .field("ranked_built", &self.ranked.get().is_some())
            .finish()
    }
}

impl LoadedIndex {
    pub fn new(
        path: PathBuf,
        index: SearchIndex,
        language: Language,
        cache: Option<TermCache>,
    ) -> Self {
        Self {
            path,
            index,
            language,
            cache,
            ranked: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// The TF-IDF index, built (or read from the cache) on first use.
    pub fn ranked(&self) -> &RankedIndex {
        self.ranked.get_or_init(|| match &self.cache {
            Some(cache) => cache.load_or_build(&self.index, self.language),
            None => RankedIndex::build(&self.index, self.language),
        })
    }
}

/// Central coordination point for tool handlers.
///
/// Keeps an LRU of parsed indexes keyed by canonical path so switching back and
/// forth between documentation builds does not re-parse them.
pub struct IndexState {
    config: Config,
    /// LRU cache of parsed indexes
    loaded: RwLock<LruCache<PathBuf, Arc<LoadedIndex>>>,
    /// Canonical path of the index searches run against
    active: RwLock<Option<PathBuf>>,
}

impl std::fmt::Debug for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexState")
            .field("config", &self.config)
            .field("loaded_count", &self.loaded.try_read().map(|l| l.len()).ok())
            .field("active", &self.active.try_read().map(|a| a.clone()).ok().flatten())
            .finish()
    }
}

impl IndexState {
    pub fn new(config: Config) -> Self {
        let capacity = NonZeroUsize::new(config.cache.lru_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            loaded: RwLock::new(LruCache::new(capacity)),
            active: RwLock::new(None),
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Load an index (or fetch it from the LRU) without activating it.
    pub async fn open(&self, path: &Path) -> Result<Arc<LoadedIndex>> {
        let canonical = tokio::fs::canonicalize(path)
            .await
            .with_context(|| format!("Search index not found at {}", path.display()))?;

        {
            let mut loaded = self.loaded.write().await;
            if let Some(index) = loaded.get(&canonical) {
                tracing::debug!("Index cache hit for {}", canonical.display());
                return Ok(index.clone());
            }
        }

        let language = self.config.language;
        let cache = self.config.cache_dir().map(TermCache::new);
        let load_path = canonical.clone();

        // Parsing is CPU-bound; keep it off the async workers
        let index = tokio::task::spawn_blocking(move || loader::load_path(&load_path))
            .await
            .context("Index loading task panicked")??;

        let loaded = Arc::new(LoadedIndex::new(canonical.clone(), index, language, cache));
        self.loaded.write().await.put(canonical, loaded.clone());
        Ok(loaded)
    }

    /// Load an index and make it the target of subsequent searches.
    ///
    /// Returns the index and whether the active index changed.
    pub async fn set_active(&self, path: &Path) -> Result<(Arc<LoadedIndex>, bool)> {
        let loaded = self.open(path).await?;
        let mut active = self.active.write().await;
        let changed = active.as_deref() != Some(loaded.path());
        if changed {
            tracing::info!(
                "Active search index: {} ({} entries)",
                loaded.path().display(),
                loaded.index().len()
            );
        }
        *active = Some(loaded.path().to_path_buf());
        Ok((loaded, changed))
    }

    /// The active index, reloading it if it fell out of the LRU.
    pub async fn active(&self) -> Option<Result<Arc<LoadedIndex>>> {
        let path = self.active.read().await.clone()?;
        Some(self.open(&path).await)
    }

    pub async fn active_path(&self) -> Option<PathBuf> {
        self.active.read().await.clone()
    }

    /// Drop every loaded index (the active path is kept).
    pub async fn clear(&self) {
        self.loaded.write().await.clear();
    }

    pub async fn loaded_count(&self) -> usize {
        self.loaded.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    const INDEX: &str = r#"var documenterSearchIndex = {"docs": [
{"location": "MaxFlow.html#", "page": "MaxFlow.jl", "title": "MaxFlow.jl", "category": "page", "text": ""},
{"location": "MaxFlow.html#MaxFlow.has_circle", "page": "MaxFlow.jl", "title": "MaxFlow.has_circle", "category": "Function", "text": "Überprüft, ob ein gegebener Graph einen Kreis hat."},
]}"#;

    fn config(dir: &Path, lru_capacity: usize) -> Config {
        let mut config = Config::default();
        config.cache.dir = Some(dir.join("cache"));
        config.cache.lru_capacity = lru_capacity;
        config
    }

    #[tokio::test]
    async fn test_set_active_reports_changes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        std::fs::write(&a, INDEX).unwrap();
        std::fs::write(&b, INDEX).unwrap();

        let state = IndexState::new(config(dir.path(), 4));
        check!(state.active().await.is_none());

        let (loaded, changed) = state.set_active(&a).await.unwrap();
        check!(changed);
        check!(loaded.index().len() == 2);

        let (_, changed) = state.set_active(&a).await.unwrap();
        check!(!changed);

        let (_, changed) = state.set_active(&b).await.unwrap();
        check!(changed);
        check!(state.loaded_count().await == 2);
    }

    #[tokio::test]
    async fn test_lru_evicts_and_active_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        std::fs::write(&a, INDEX).unwrap();
        std::fs::write(&b, INDEX).unwrap();

        let state = IndexState::new(config(dir.path(), 1));
        state.set_active(&a).await.unwrap();
        state.open(&b).await.unwrap();
        check!(state.loaded_count().await == 1);

        // `a` was evicted by `b` but is still active
        let active = state.active().await.unwrap().unwrap();
        check!(active.path() == std::fs::canonicalize(&a).unwrap());
    }

    #[tokio::test]
    async fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let state = IndexState::new(config(dir.path(), 2));
        check!(state.set_active(&dir.path().join("missing.js")).await.is_err());

        let broken = dir.path().join("broken.js");
        std::fs::write(&broken, "var documenterSearchIndex = {\"docs\": [").unwrap();
        let err = state.set_active(&broken).await.unwrap_err();
        check!(err.downcast_ref::<crate::error::LoadError>().is_some());
        check!(state.active_path().await.is_none());
    }

    #[tokio::test]
    async fn test_ranked_index_is_built_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.js");
        std::fs::write(&path, INDEX).unwrap();

        let state = IndexState::new(config(dir.path(), 2));
        let (loaded, _) = state.set_active(&path).await.unwrap();
        let first: *const RankedIndex = loaded.ranked();
        let second: *const RankedIndex = loaded.ranked();
        check!(std::ptr::eq(first, second));
        check!(loaded.ranked().document_count() == 2);
    }
}
