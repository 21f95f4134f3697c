//! Search handler: substring or TF-IDF ranked queries against the active index.

use crate::config::Config;
use crate::entry::{Category, IndexEntry};
use crate::search::{MatchField, MatchOptions, suggest_titles};
use crate::state::{IndexState, LoadedIndex};
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// How the query is matched against entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Case-insensitive substring match on title, text and location
    #[default]
    Substring,
    /// TF-IDF relevance over stemmed title and text terms
    Ranked,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Search query
    pub query: String,
    /// Matching strategy (default: substring)
    #[serde(default)]
    pub mode: SearchMode,
    /// Only return entries of this category: page, section, Type, Function or Method
    #[serde(default)]
    pub category: Option<String>,
    /// Only return entries on this page, e.g. "Greedy.jl"
    #[serde(default)]
    pub page: Option<String>,
    /// Maximum number of results to return (default from configuration)
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            mode: SearchMode::default(),
            category: None,
            page: None,
            limit: None,
        }
    }
}

/// One result, serializable for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit<'a> {
    #[serde(flatten)]
    pub entry: &'a IndexEntry,
    /// Field a substring query matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<MatchField>,
    /// TF-IDF score of a ranked query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Results of one search, before formatting.
#[derive(Debug, Clone)]
pub struct SearchOutcome<'a> {
    pub hits: Vec<SearchHit<'a>>,
    /// Matches before the limit was applied
    pub total: usize,
    pub mode: SearchMode,
}

/// Run a search request against an index.
pub fn execute_search<'a>(
    loaded: &'a LoadedIndex,
    request: &SearchRequest,
    config: &Config,
) -> Result<SearchOutcome<'a>, String> {
    let options = MatchOptions {
        categories: match &request.category {
            Some(category) => vec![category.parse::<Category>().map_err(|e| e.to_string())?],
            None => vec![],
        },
        page: request.page.clone(),
        limit: None,
    };
    let limit = config.limit(request.limit);
    let index = loaded.index();

    let mut hits: Vec<SearchHit<'a>> = match request.mode {
        SearchMode::Substring => index
            .find_with(&request.query, &options)
            .into_iter()
            .map(|m| SearchHit {
                entry: m.entry,
                matched: Some(m.field),
                score: None,
            })
            .collect(),
        SearchMode::Ranked => loaded
            .ranked()
            .search(&request.query, index.len())
            .into_iter()
            .map(|(position, score)| (&index.entries()[position], score))
            .filter(|(entry, _)| options.accepts(entry))
            .map(|(entry, score)| SearchHit {
                entry,
                matched: None,
                score: Some(score),
            })
            .collect(),
    };

    let total = hits.len();
    hits.truncate(limit);

    tracing::debug!(
        "Search '{}' ({:?}) returned {} of {} matches",
        request.query,
        request.mode,
        hits.len(),
        total
    );

    Ok(SearchOutcome {
        hits,
        total,
        mode: request.mode,
    })
}

/// Execute the search operation against the active index.
pub async fn handle_search(state: &IndexState, request: SearchRequest) -> Result<String, String> {
    let loaded = super::require_active(state).await?;
    let outcome = execute_search(&loaded, &request, state.config())?;

    if outcome.hits.is_empty() {
        return Ok(format_no_results(&loaded, &request));
    }

    Ok(format_search_results(&outcome, &request.query))
}

/// Format search results into a readable string output.
pub fn format_search_results(outcome: &SearchOutcome<'_>, query: &str) -> String {
    let mode = match outcome.mode {
        SearchMode::Substring => "substring",
        SearchMode::Ranked => "ranked",
    };

    let mut output = if outcome.hits.len() < outcome.total {
        format!(
            "Search results for '{}' ({}, showing {} of {}):\n\n",
            query,
            mode,
            outcome.hits.len(),
            outcome.total
        )
    } else {
        format!(
            "Search results for '{}' ({}, {} found):\n\n",
            query, mode, outcome.total
        )
    };

    let max_score = outcome
        .hits
        .first()
        .and_then(|hit| hit.score)
        .filter(|score| *score > 0.0)
        .unwrap_or(1.0);

    for (idx, hit) in outcome.hits.iter().enumerate() {
        let entry = hit.entry;
        let _ = write!(
            output,
            "{}. `{}` ({}) - {}",
            idx + 1,
            entry.title,
            entry.category,
            entry.location
        );
        if let Some(score) = hit.score {
            let relevance = ((score / max_score) * 100.0).round().max(0.0) as u8;
            let _ = write!(output, " - relevance: {}%", relevance);
        }
        output.push('\n');

        let summary = entry.summary();
        if !summary.is_empty() {
            let _ = writeln!(output, "   {}", summary);
        }
        output.push('\n');
    }

    output
}

fn format_no_results(loaded: &LoadedIndex, request: &SearchRequest) -> String {
    let mut msg = format!("No results found for '{}'", request.query);
    if let Some(category) = &request.category {
        let _ = write!(msg, " in category '{}'", category);
    }
    if let Some(page) = &request.page {
        let _ = write!(msg, " on page '{}'", page);
    }
    msg.push_str(".\n\n");

    let suggestions = suggest_titles(loaded.index(), &request.query);
    if !suggestions.is_empty() {
        msg.push_str("Did you mean:\n");
        for suggestion in &suggestions {
            let entry = suggestion.entry();
            let _ = writeln!(msg, "• `{}` ({})", entry.title, entry.category);
        }
        msg.push('\n');
    }

    msg.push_str("Search tips:\n");
    msg.push_str("• Try a shorter or more general term\n");
    msg.push_str("• Search for symbol names like 'dijkstra' or module names like 'Greedy'\n");
    if request.mode == SearchMode::Substring {
        msg.push_str("• Use mode 'ranked' to match individual words in any order\n");
    } else {
        msg.push_str("• Ranked search uses stemming; try the substring mode for exact fragments\n");
    }

    msg
}
