//! On-disk cache for ranked indexes.
//!
//! Building the TF-IDF index means stemming every docstring, so it is persisted
//! with postcard. Entries are keyed by the content fingerprint of the search index
//! and the analyzer language: a documentation rebuild changes the fingerprint and
//! the stale file is simply never looked up again.

use crate::error::Result;
use crate::index::SearchIndex;
use crate::search::{Language, RankedIndex};
use anyhow::Context;
use postcard::{from_io, to_io};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Directory of persisted ranked indexes.
#[derive(Debug, Clone)]
pub struct TermCache {
    dir: PathBuf,
}

impl TermCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file for an index/language pair.
    pub fn path_for(&self, index: &SearchIndex, language: Language) -> PathBuf {
        self.dir
            .join(format!("{:016x}-{}.index", index.fingerprint(), language))
    }

    /// Load the cached ranked index, or build and store it.
    ///
    /// Cache problems are logged and never fail the search.
    pub fn load_or_build(&self, index: &SearchIndex, language: Language) -> RankedIndex {
        let path = self.path_for(index, language);

        if let Some(ranked) = Self::load(&path, index.len(), language) {
            tracing::debug!(
                "Loaded cached ranked index ({} terms, {} docs) from {}",
                ranked.term_count(),
                ranked.document_count(),
                path.display()
            );
            return ranked;
        }

        let ranked = RankedIndex::build(index, language);
        if let Err(e) = self.store(&path, &ranked) {
            tracing::warn!("Failed to cache ranked index: {:#}", e);
        }
        ranked
    }

    /// Read a cached index. Unreadable or mismatched files are removed.
    fn load(path: &Path, documents: usize, language: Language) -> Option<RankedIndex> {
        let file = std::fs::File::open(path).ok()?;
        let mut reader = BufReader::new(file);
        let mut buf = [0u8; 8192];

        let decoded: postcard::Result<(RankedIndex, _)> = from_io((&mut reader, &mut buf));
        match decoded {
            Ok((ranked, _))
                if ranked.document_count() == documents && ranked.language() == language =>
            {
                Some(ranked)
            }
            Ok(_) => {
                tracing::info!(
                    "Cached index at {} does not match, will rebuild",
                    path.display()
                );
                let _ = std::fs::remove_file(path);
                None
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to deserialize cached index at {}: {}",
                    path.display(),
                    e
                );
                let _ = std::fs::remove_file(path);
                None
            }
        }
    }

    /// Write through a temporary file so readers never see a partial index.
    fn store(&self, path: &Path, ranked: &RankedIndex) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache directory {}", self.dir.display()))?;

        let tmp = path.with_extension(format!("tmp{}", std::process::id()));
        let file = std::fs::File::create(&tmp)
            .with_context(|| format!("Failed to create {}", tmp.display()))?;

        let written = to_io(ranked, BufWriter::new(file))
            .map_err(anyhow::Error::from)
            .and_then(|mut writer| writer.flush().map_err(anyhow::Error::from))
            .and_then(|_| std::fs::rename(&tmp, path).map_err(anyhow::Error::from));

        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.context(format!("Failed to write ranked index to {}", path.display())));
        }

        tracing::debug!("Cached ranked index to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Category, IndexEntry};
    use assert2::check;

    fn sample() -> SearchIndex {
        SearchIndex::new(vec![
            IndexEntry {
                location: "Knapsack.html#".to_string(),
                page: "Knapsack.jl".to_string(),
                title: "Knapsack.jl".to_string(),
                category: Category::Page,
                text: String::new(),
            },
            IndexEntry {
                location: "Knapsack.html#Knapsack.unzip-Tuple{Any}".to_string(),
                page: "Knapsack.jl".to_string(),
                title: "Knapsack.unzip".to_string(),
                category: Category::Method,
                text: "Umkehrfunktion von zip".to_string(),
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_build_then_reuse() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TermCache::new(dir.path().join("cache"));
        let index = sample();

        let built = cache.load_or_build(&index, Language::German);
        let path = cache.path_for(&index, Language::German);
        check!(path.exists());

        let reloaded = cache.load_or_build(&index, Language::German);
        check!(reloaded.search("unzip", 5) == built.search("unzip", 5));
        check!(reloaded.term_count() == built.term_count());
    }

    #[test]
    fn test_language_is_part_of_the_key() {
        let cache = TermCache::new("/tmp/unused");
        let index = sample();
        check!(cache.path_for(&index, Language::English) != cache.path_for(&index, Language::German));
    }

    #[test]
    fn test_corrupt_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TermCache::new(dir.path());
        let index = sample();
        let path = cache.path_for(&index, Language::English);
        std::fs::write(&path, b"\xff\xff\xff\xff\xff\xff\xff\xff\xff\xff").unwrap();

        let ranked = cache.load_or_build(&index, Language::English);
        check!(ranked.document_count() == 2);
        check!(!ranked.search("unzip", 5).is_empty());

        // The rebuilt index replaced the corrupt file
        let bytes = std::fs::read(&path).unwrap();
        let restored: RankedIndex = postcard::from_bytes(&bytes).unwrap();
        check!(restored.document_count() == 2);
    }

    #[test]
    fn test_unwritable_dir_still_builds() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let cache = TermCache::new(blocker.join("cache"));
        let ranked = cache.load_or_build(&sample(), Language::None);
        check!(ranked.document_count() == 2);
    }
}
