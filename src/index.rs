//! The loaded, immutable search index.

use crate::entry::{Category, IndexEntry, Location};
use crate::error::LoadError;
use ahash::AHashMap;
use std::collections::BTreeMap;
use xxhash_rust::xxh3::Xxh3;

/// Ordered sequence of index records with a location lookup table.
///
/// Built once by the loader and never mutated afterwards; a documentation
/// rebuild produces a whole new index.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<IndexEntry>,
    /// Map from location to position in `entries`
    by_location: AHashMap<String, usize>,
}

/// Per-page overview used by `list_pages`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub name: String,
    /// Page file the entries link into
    pub document: String,
    /// Total entries on the page, including the page entry itself
    pub entries: usize,
    pub sections: usize,
    pub symbols: usize,
}

impl SearchIndex {
    /// Build an index from records, rejecting duplicate locations.
    pub fn new(entries: Vec<IndexEntry>) -> Result<Self, LoadError> {
        let mut by_location = AHashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if let Some(first) = by_location.insert(entry.location.clone(), position) {
                return Err(LoadError::DuplicateLocation {
                    location: entry.location.clone(),
                    first,
                    second: position,
                });
            }
        }
        Ok(Self {
            entries,
            by_location,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexEntry> {
        self.entries.iter()
    }

    /// Consume the index, returning records in their original order.
    pub fn into_entries(self) -> Vec<IndexEntry> {
        self.entries
    }

    pub fn get(&self, location: &str) -> Option<&IndexEntry> {
        self.position(location).map(|idx| &self.entries[idx])
    }

    pub fn position(&self, location: &str) -> Option<usize> {
        self.by_location.get(location).copied()
    }

    /// Entries whose `page` equals `page`, in index order.
    pub fn entries_on_page<'a>(&'a self, page: &'a str) -> impl Iterator<Item = &'a IndexEntry> {
        self.entries.iter().filter(move |entry| entry.page == page)
    }

    /// Distinct pages in order of first appearance.
    pub fn pages(&self) -> Vec<PageSummary> {
        let mut pages: Vec<PageSummary> = Vec::new();
        let mut seen: AHashMap<&str, usize> = AHashMap::new();

        for entry in &self.entries {
            let slot = *seen.entry(entry.page.as_str()).or_insert_with(|| {
                pages.push(PageSummary {
                    name: entry.page.clone(),
                    document: Location::parse(&entry.location).document.to_string(),
                    entries: 0,
                    sections: 0,
                    symbols: 0,
                });
                pages.len() - 1
            });

            let page = &mut pages[slot];
            page.entries += 1;
            match entry.category {
                Category::Page => {}
                Category::Section => page.sections += 1,
                Category::Type | Category::Function | Category::Method => page.symbols += 1,
            }
        }

        pages
    }

    /// Number of entries per category, in category order.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.category).or_insert(0) += 1;
        }
        counts
    }

    /// Content hash over every field of every record, in order.
    ///
    /// Two indexes with the same fingerprint produce identical search results,
    /// which makes it a safe key for the persisted term index.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        for entry in &self.entries {
            for field in [
                entry.location.as_str(),
                entry.page.as_str(),
                entry.title.as_str(),
                entry.category.as_str(),
                entry.text.as_str(),
            ] {
                hasher.update(field.as_bytes());
                hasher.update(&[0]);
            }
            hasher.update(&[0xff]);
        }
        hasher.digest()
    }
}

impl<'a> IntoIterator for &'a SearchIndex {
    type Item = &'a IndexEntry;
    type IntoIter = std::slice::Iter<'a, IndexEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
