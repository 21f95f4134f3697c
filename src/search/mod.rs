//! Query infrastructure for documentation search indexes.
//!
//! Two strategies are offered over the same entries:
//! - substring matching, which mirrors the site's own search box
//! - TF-IDF ranking, with tokenization and stemming, for multi-word queries

pub(crate) mod matcher;
pub(crate) mod suggest;
pub(crate) mod terms;
pub(crate) mod tokenize;

pub use matcher::{Match, MatchField, MatchOptions};
pub use suggest::{MAX_SUGGESTIONS, MIN_SIMILARITY, Suggestion, suggest_locations, suggest_titles};
pub use terms::RankedIndex;
pub use tokenize::{Analyzer, Language};
