//! Switching the active search index.

use crate::state::{IndexState, LoadedIndex};
use rmcp::schemars;
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetIndexRequest {
    /// Path to a Documenter search_index.js (or a JSON export of the same records)
    pub path: String,
}

/// Load the index at `request.path` and make it active.
pub async fn handle_set_index(state: &IndexState, request: SetIndexRequest) -> Result<String, String> {
    let path = PathBuf::from(expand_tilde(&request.path).into_owned());
    let previous = state.active_path().await;

    let (loaded, changed) = state
        .set_active(&path)
        .await
        .map_err(|e| format!("Failed to set search index: {:#}", e))?;

    Ok(format_response(&loaded, previous.as_deref(), changed))
}

/// Format a summary of the newly active index.
pub fn format_response(
    loaded: &LoadedIndex,
    previous: Option<&std::path::Path>,
    changed: bool,
) -> String {
    let index = loaded.index();
    let mut response = format!("Search index set to: {}\n", loaded.path().display());

    match (previous, changed) {
        (Some(previous), true) => {
            let _ = writeln!(response, "Previously: {}", previous.display());
        }
        (Some(_), false) => response.push_str("(unchanged)\n"),
        (None, _) => {}
    }
    response.push('\n');

    let counts = index
        .category_counts()
        .iter()
        .map(|(category, count)| format!("{} {}", count, category))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(response, "Entries: {} ({})", index.len(), counts);

    let pages = index.pages();
    let _ = writeln!(response, "Pages ({}):", pages.len());
    for page in &pages {
        let _ = writeln!(response, "  - {} ({})", page.name, page.document);
    }

    response
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
