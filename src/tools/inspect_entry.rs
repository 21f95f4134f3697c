//! Full view of a single entry, looked up by location or exact title.

use crate::entry::IndexEntry;
use crate::index::SearchIndex;
use crate::search::{suggest_locations, suggest_titles};
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct InspectEntryRequest {
    /// Entry location (e.g. "ShortestPaths.html#ShortestPaths.dijkstra") or exact title
    pub location: String,
}

/// Show one entry in full.
pub async fn handle_inspect_entry(
    state: &IndexState,
    request: InspectEntryRequest,
) -> Result<String, String> {
    let loaded = super::require_active(state).await?;
    let index = loaded.index();

    match resolve(index, &request.location) {
        Some(entry) => Ok(format_entry(index, entry)),
        None => Err(format_not_found(index, &request.location)),
    }
}

/// Find an entry by exact location, falling back to the first exact title match.
pub fn resolve<'a>(index: &'a SearchIndex, query: &str) -> Option<&'a IndexEntry> {
    let query = query.trim();
    index
        .get(query)
        .or_else(|| index.iter().find(|entry| entry.title == query))
}

pub fn format_entry(index: &SearchIndex, entry: &IndexEntry) -> String {
    let mut output = format!("# {}\n\n", entry.title);
    let location = entry.location();

    let _ = writeln!(output, "**Category:** {}", entry.category);
    let _ = writeln!(output, "**Page:** {}", entry.page);
    let _ = writeln!(output, "**Location:** {}", entry.location);
    if entry.category.is_symbol() {
        let (symbol, signature) = location.symbol();
        if !symbol.is_empty() {
            let _ = writeln!(output, "**Symbol:** `{}`", symbol);
        }
        if let Some(signature) = signature {
            let _ = writeln!(output, "**Signature:** `{}`", signature);
        }
    }

    let text = entry.text.trim_end();
    if !text.is_empty() {
        output.push_str("\n## Text\n\n");
        output.push_str(text);
        output.push('\n');
    }

    if location.is_page() {
        let contents: Vec<_> = index
            .entries_on_page(&entry.page)
            .filter(|other| other.location != entry.location)
            .collect();
        if !contents.is_empty() {
            let _ = write!(output, "\n## Contents ({})\n\n", contents.len());
            for other in contents {
                let _ = writeln!(
                    output,
                    "- `{}` ({}) - {}",
                    other.title, other.category, other.location
                );
            }
        }
    }

    output
}

fn format_not_found(index: &SearchIndex, query: &str) -> String {
    let mut msg = format!("No entry found at '{}'.", query);

    let mut suggestions = suggest_locations(index, query);
    if suggestions.is_empty() {
        suggestions = suggest_titles(index, query);
    }

    if suggestions.is_empty() {
        msg.push_str("\n\nUse the search tool to find entry locations.");
    } else {
        msg.push_str("\n\nDid you mean:\n");
        for suggestion in &suggestions {
            let entry = suggestion.entry();
            let _ = writeln!(msg, "• {} ({})", entry.location, entry.title);
        }
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Category;
    use assert2::{check, let_assert};

    fn index() -> SearchIndex {
        let entry = |location: &str, title: &str, category, text: &str| IndexEntry {
            location: location.to_string(),
            page: "ShortestPaths.jl".to_string(),
            title: title.to_string(),
            category,
            text: text.to_string(),
        };
        SearchIndex::new(vec![
            entry("ShortestPaths.html#", "ShortestPaths.jl", Category::Page, ""),
            entry(
                "ShortestPaths.html#ShortestPaths.dijkstra-Tuple{ADMStructures.Graph,Any}",
                "ShortestPaths.dijkstra",
                Category::Method,
                "Algorithmus von Dijkstra\n\n\n\n",
            ),
            entry(
                "ShortestPaths.html#ShortestPaths.bellman_ford",
                "ShortestPaths.bellman_ford",
                Category::Function,
                "Algorithmus von Bellman und Ford",
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_by_location_and_title() {
        let index = index();
        let_assert!(Some(entry) = resolve(&index, "ShortestPaths.html#ShortestPaths.bellman_ford"));
        check!(entry.category == Category::Function);

        let_assert!(Some(entry) = resolve(&index, " ShortestPaths.dijkstra "));
        check!(entry.category == Category::Method);

        check!(resolve(&index, "dijkstra").is_none());
    }

    #[test]
    fn test_method_shows_signature() {
        let index = index();
        let_assert!(Some(entry) = resolve(&index, "ShortestPaths.dijkstra"));
        let output = format_entry(&index, entry);
        check!(output.starts_with("# ShortestPaths.dijkstra\n"));
        check!(output.contains("**Symbol:** `ShortestPaths.dijkstra`"));
        check!(output.contains("**Signature:** `Tuple{ADMStructures.Graph,Any}`"));
        check!(output.contains("## Text\n\nAlgorithmus von Dijkstra\n"));
    }

    #[test]
    fn test_page_lists_contents() {
        let index = index();
        let_assert!(Some(entry) = resolve(&index, "ShortestPaths.html#"));
        let output = format_entry(&index, entry);
        check!(output.contains("## Contents (2)"));
        check!(output.contains("- `ShortestPaths.bellman_ford` (Function)"));
        check!(!output.contains("**Symbol:**"));
    }

    #[test]
    fn test_not_found_suggests_locations() {
        let index = index();
        let msg = format_not_found(&index, "ShortestPaths.html#ShortestPaths.bellman_fort");
        check!(msg.contains("Did you mean:"));
        check!(msg.contains("• ShortestPaths.html#ShortestPaths.bellman_ford (ShortestPaths.bellman_ford)"));
    }
}
