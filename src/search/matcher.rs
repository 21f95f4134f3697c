//! Case-insensitive substring matching, the way the site's search box filters entries.

use crate::entry::{Category, IndexEntry};
use crate::index::SearchIndex;
use serde::Serialize;

/// Which field of an entry a query matched, in ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Title,
    Text,
    Location,
}

/// A matched entry and where it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    /// Position of the entry in the index
    pub position: usize,
    /// Best field the query was found in
    pub field: MatchField,
    pub entry: &'a IndexEntry,
}

/// Filters applied on top of the text match.
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    /// Only entries of these categories (empty means all)
    pub categories: Vec<Category>,
    /// Only entries on this page
    pub page: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
}

impl MatchOptions {
    /// Whether `entry` passes the category and page filters.
    pub fn accepts(&self, entry: &IndexEntry) -> bool {
        (self.categories.is_empty() || self.categories.contains(&entry.category))
            && self.page.as_deref().is_none_or(|page| entry.page == page)
    }
}

impl SearchIndex {
    /// Entries whose title, text or location contain `query`, ignoring case.
    ///
    /// Title matches come first, then entries that only match in their text,
    /// then entries that only match in their location. Within each group the
    /// original index order is kept.
    ///
    /// The query is trimmed first, so an empty or whitespace-only query
    /// (`""`, `"   "`, `"\n\n"`) matches nothing rather than every entry.
    pub fn find(&self, query: &str) -> Vec<Match<'_>> {
        self.find_with(query, &MatchOptions::default())
    }

    /// [`find`](Self::find) with category/page filters and a result limit.
    ///
    /// Blank queries return no matches regardless of the filters.
    pub fn find_with(&self, query: &str, options: &MatchOptions) -> Vec<Match<'_>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return vec![];
        }

        let mut matches: Vec<Match<'_>> = self
            .iter()
            .enumerate()
            .filter(|(_, entry)| options.accepts(entry))
            .filter_map(|(position, entry)| {
                match_field(entry, &needle).map(|field| Match {
                    position,
                    field,
                    entry,
                })
            })
            .collect();

        // Stable sort keeps index order inside each field group
        matches.sort_by_key(|m| m.field);

        if let Some(limit) = options.limit {
            matches.truncate(limit);
        }

        tracing::debug!("Substring query '{}' matched {} entries", query, matches.len());
        matches
    }
}

/// Best field of `entry` containing the already-lowercased needle.
fn match_field(entry: &IndexEntry, needle: &str) -> Option<MatchField> {
    if contains_ignore_case(&entry.title, needle) {
        Some(MatchField::Title)
    } else if contains_ignore_case(&entry.text, needle) {
        Some(MatchField::Text)
    } else if contains_ignore_case(&entry.location, needle) {
        Some(MatchField::Location)
    } else {
        None
    }
}

fn contains_ignore_case(haystack: &str, lowercase_needle: &str) -> bool {
    if lowercase_needle.is_empty() {
        return true;
    }
    if haystack.is_ascii() && lowercase_needle.is_ascii() {
        // Avoid allocating for the common case
        return haystack
            .as_bytes()
            .windows(lowercase_needle.len())
            .any(|window| window.eq_ignore_ascii_case(lowercase_needle.as_bytes()));
    }
    haystack.to_lowercase().contains(lowercase_needle)
}
