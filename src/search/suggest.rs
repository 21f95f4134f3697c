//! Fuzzy "did you mean" suggestions for queries and locations that found nothing.

use crate::entry::IndexEntry;
use crate::index::SearchIndex;
use ahash::AHashSet;
use rapidfuzz::distance::jaro_winkler;

/// Suggestions scoring at or below this are not worth showing.
pub const MIN_SIMILARITY: f64 = 0.8;

/// Maximum number of suggestions returned.
pub const MAX_SUGGESTIONS: usize = 5;

/// A fuzzy suggestion with relevance score.
#[derive(Debug, Clone)]
pub struct Suggestion<'a> {
    pub entry: &'a IndexEntry,
    pub score: f64,
}

impl<'a> Suggestion<'a> {
    pub const fn entry(&self) -> &'a IndexEntry {
        self.entry
    }

    /// Get the relevance score (0.0 to 1.0, higher is better).
    pub const fn score(&self) -> f64 {
        self.score
    }
}

/// Titles similar to `query`, best first.
///
/// Each entry is compared on its full title and on the last dotted segment, so
/// `dikstra` finds `ShortestPaths.dijkstra`.
pub fn suggest_titles<'a>(index: &'a SearchIndex, query: &str) -> Vec<Suggestion<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return vec![];
    }

    collect(index.iter().map(|entry| {
        let full = similarity(&query, &entry.title);
        let short = similarity(&query, entry.short_name());
        (entry, full.max(short))
    }))
}

/// Locations similar to `location`, best first.
pub fn suggest_locations<'a>(index: &'a SearchIndex, location: &str) -> Vec<Suggestion<'a>> {
    let location = location.trim().to_lowercase();
    if location.is_empty() {
        return vec![];
    }

    collect(
        index
            .iter()
            .map(|entry| (entry, similarity(&location, &entry.location))),
    )
}

fn similarity(lowercase_query: &str, candidate: &str) -> f64 {
    jaro_winkler::similarity(lowercase_query.chars(), candidate.to_lowercase().chars())
}

fn collect<'a>(scored: impl Iterator<Item = (&'a IndexEntry, f64)>) -> Vec<Suggestion<'a>> {
    let mut suggestions: Vec<Suggestion<'a>> = scored
        .filter(|(_, score)| *score > MIN_SIMILARITY)
        .map(|(entry, score)| Suggestion { entry, score })
        .collect();

    // Stable: equal scores keep index order
    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
    // Titles repeat across method overloads; keep the best-scored one
    let mut seen = AHashSet::new();
    suggestions.retain(|s| seen.insert(s.entry.title.as_str()));
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Category;
    use assert2::check;

    fn sample() -> SearchIndex {
        let entry = |location: &str, title: &str| IndexEntry {
            location: location.to_string(),
            page: "ShortestPaths.jl".to_string(),
            title: title.to_string(),
            category: Category::Function,
            text: String::new(),
        };
        SearchIndex::new(vec![
            entry("ShortestPaths.html#ShortestPaths.dijkstra", "ShortestPaths.dijkstra"),
            entry("ShortestPaths.html#ShortestPaths.bellman_ford", "ShortestPaths.bellman_ford"),
            entry("ShortestPaths.html#ShortestPaths.reachable", "ShortestPaths.reachable"),
        ])
        .unwrap()
    }

    #[test]
    fn test_misspelled_short_name() {
        let index = sample();
        let suggestions = suggest_titles(&index, "dikstra");
        check!(!suggestions.is_empty());
        check!(suggestions[0].entry().title == "ShortestPaths.dijkstra");
        check!(suggestions[0].score() > MIN_SIMILARITY);
    }

    #[test]
    fn test_unrelated_query_has_no_suggestions() {
        check!(suggest_titles(&sample(), "zzzzqqq").is_empty());
        check!(suggest_titles(&sample(), "  ").is_empty());
    }

    #[test]
    fn test_repeated_titles_are_suggested_once() {
        let entry = |location: &str, title: &str| IndexEntry {
            location: location.to_string(),
            page: "Greedy.jl".to_string(),
            title: title.to_string(),
            category: Category::Method,
            text: String::new(),
        };
        let index = SearchIndex::new(vec![
            entry("Greedy.html#Greedy.kruskal-Tuple{Any}", "Greedy.kruskal"),
            entry("Foo.html#Foo.kruskal", "Foo.kruskal"),
            entry("Greedy.html#Greedy.kruskal-Tuple{Any,Any}", "Greedy.kruskal"),
        ])
        .unwrap();

        let titles: Vec<_> = suggest_titles(&index, "kruskal")
            .iter()
            .map(|s| s.entry().title.as_str())
            .collect();
        check!(titles == ["Greedy.kruskal", "Foo.kruskal"]);
    }

    #[test]
    fn test_location_suggestions() {
        let index = sample();
        let suggestions = suggest_locations(&index, "ShortestPaths.html#ShortestPaths.reachble");
        check!(suggestions[0].entry().title == "ShortestPaths.reachable");
        check!(suggestions.len() <= MAX_SUGGESTIONS);
    }
}
