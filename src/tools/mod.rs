pub mod inspect_entry;
pub mod list_pages;
pub mod search;
pub mod set_index;

pub use inspect_entry::*;
pub use list_pages::*;
pub use search::*;
pub use set_index::*;

use crate::state::{IndexState, LoadedIndex};
use std::sync::Arc;

/// The index tool calls operate on, or a message explaining how to configure one.
pub(crate) async fn require_active(state: &IndexState) -> Result<Arc<LoadedIndex>, String> {
    match state.active().await {
        Some(Ok(index)) => Ok(index),
        Some(Err(e)) => Err(format!("Failed to load the active search index: {:#}", e)),
        None => Err("No search index configured.\n\n\
             To configure one:\n\
             • Use set_index with the path to a Documenter search_index.js\n\
             • Or start the server with --index / DOCSEARCH_INDEX"
            .to_string()),
    }
}
