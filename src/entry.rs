//! Search index records and the views derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification of an index record.
///
/// The wire spellings are exactly what Documenter writes: lowercase for the
/// navigational kinds, capitalised for documented symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "page")]
    Page,
    #[serde(rename = "section")]
    Section,
    #[serde(rename = "Type")]
    Type,
    #[serde(rename = "Function")]
    Function,
    #[serde(rename = "Method")]
    Method,
}

impl Category {
    pub const ALL: [Self; 5] = [
        Self::Page,
        Self::Section,
        Self::Type,
        Self::Function,
        Self::Method,
    ];

    /// The spelling used in the index file.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Section => "section",
            Self::Type => "Type",
            Self::Function => "Function",
            Self::Method => "Method",
        }
    }

    /// Pages and sections only exist to link into the site structure.
    pub const fn is_navigational(self) -> bool {
        matches!(self, Self::Page | Self::Section)
    }

    /// Types, functions and methods carry extracted docstrings.
    pub const fn is_symbol(self) -> bool {
        !self.is_navigational()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for category names that match none of the known kinds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}' (expected one of: page, section, Type, Function, Method)")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive, for user input. The loader itself is exact.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// One record in a documentation search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Relative URL with anchor, e.g. `Greedy.html#Greedy.kruskal-Tuple{Any,Any}`
    pub location: String,
    /// Human-readable page name
    pub page: String,
    /// Section or symbol title
    pub title: String,
    pub category: Category,
    /// Docstring body; empty for pure navigation entries
    #[serde(default)]
    pub text: String,
}

impl IndexEntry {
    pub fn location(&self) -> Location<'_> {
        Location::parse(&self.location)
    }

    /// First meaningful line of the body, suitable for a result listing.
    ///
    /// Documenter leaks `DocTestSetup = quote ... end` blocks into section text
    /// with no separator after `end`; that preamble is skipped.
    pub fn summary(&self) -> &str {
        let body = strip_doctest_setup(&self.text);
        body.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }

    /// Last dotted segment of the title (`ShortestPaths.dijkstra` gives `dijkstra`).
    pub fn short_name(&self) -> &str {
        self.title.rsplit('.').next().unwrap_or(&self.title)
    }
}

fn strip_doctest_setup(text: &str) -> &str {
    const PREAMBLE: &str = "DocTestSetup = quote";
    const TERMINATOR: &str = "\nend";

    if !text.starts_with(PREAMBLE) {
        return text;
    }
    match text.find(TERMINATOR) {
        Some(idx) => &text[idx + TERMINATOR.len()..],
        None => "",
    }
}

/// Parsed view of an entry's `location`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    /// Page file, e.g. `ShortestPaths.html`
    pub document: &'a str,
    /// Anchor after `#`; empty for whole-page entries
    pub fragment: &'a str,
}

impl<'a> Location<'a> {
    pub fn parse(location: &'a str) -> Self {
        match location.split_once('#') {
            Some((document, fragment)) => Self { document, fragment },
            None => Self {
                document: location,
                fragment: "",
            },
        }
    }

    /// True when the location addresses a whole page rather than an anchor in it.
    pub const fn is_page(&self) -> bool {
        self.fragment.is_empty()
    }

    /// Split a symbol anchor into its dotted path and method signature.
    ///
    /// - `ShortestPaths.dijkstra-Tuple{ADMStructures.Graph,Any}` → (`ShortestPaths.dijkstra`, `Tuple{ADMStructures.Graph,Any}`)
    /// - `ADMStructures.rank` → (`ADMStructures.rank`, None)
    pub fn symbol(&self) -> (&'a str, Option<&'a str>) {
        let fragment = self.fragment;
        if fragment.ends_with('}')
            && let Some(idx) = fragment.find('-')
            && fragment[idx + 1..].contains('{')
        {
            return (&fragment[..idx], Some(&fragment[idx + 1..]));
        }
        (fragment, None)
    }

    /// Section anchor without Documenter's `-N` disambiguation suffix.
    pub fn slug(&self) -> &'a str {
        match self.fragment.rsplit_once('-') {
            Some((head, counter))
                if !head.is_empty()
                    && !counter.is_empty()
                    && counter.bytes().all(|b| b.is_ascii_digit()) =>
            {
                head
            }
            _ => self.fragment,
        }
    }
}

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.document, self.fragment)
    }
}
