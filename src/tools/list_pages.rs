use crate::index::PageSummary;
use crate::state::IndexState;
use std::fmt::Write as _;

/// List the pages of the active index with per-page entry counts.
pub async fn handle_list_pages(state: &IndexState) -> Result<String, String> {
    let loaded = super::require_active(state).await?;
    let pages = loaded.index().pages();
    Ok(format_pages(&pages, loaded.index().len()))
}

pub fn format_pages(pages: &[PageSummary], total_entries: usize) -> String {
    if pages.is_empty() {
        return "The search index contains no pages.".to_string();
    }

    let mut output = format!(
        "Pages ({}, {} entries total):\n\n",
        pages.len(),
        total_entries
    );
    for page in pages {
        let _ = writeln!(
            output,
            "- **{}** ({}): {} entries, {} sections, {} symbols",
            page.name, page.document, page.entries, page.sections, page.symbols
        );
    }
    output
}
