pub mod cache;
pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod index;
pub mod loader;
pub mod search;
pub mod server;
pub mod state;
pub mod tools;
pub mod tracing;

pub use config::Config;
pub use entry::{Category, IndexEntry, Location};
pub use error::{ConfigError, LoadError};
pub use index::{PageSummary, SearchIndex};
pub use search::{Match, MatchField, MatchOptions, RankedIndex};
pub use state::{IndexState, LoadedIndex};
