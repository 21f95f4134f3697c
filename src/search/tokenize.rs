//! Text tokenization and stemming for the ranked index.

use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum token length for indexing. Short tokens like `m` or `E` appear in docstrings
/// as variable names and are worth keeping.
const MIN_TOKEN_LENGTH: usize = 1;

/// Common English stop words to filter out from indexing.
pub(crate) const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with",
];

/// Common German stop words. Documenter sites for German-language packages carry
/// docstrings like "Gibt die Basen eines Matroids zurück".
pub(crate) const GERMAN_STOP_WORDS: &[&str] = &[
    "als", "am", "an", "auch", "auf", "aus", "bei", "das", "dem", "den", "der", "des", "die",
    "ein", "eine", "einem", "einen", "einer", "eines", "es", "für", "hat", "im", "in", "ist",
    "mit", "nicht", "ob", "oder", "sich", "sind", "und", "von", "wird", "wie", "zu", "zum", "zur",
];

/// Language used for stop words and stemming.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    German,
    /// Lowercase only: no stop words, no stemming
    None,
}

impl Language {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::German => "german",
            Self::None => "none",
        }
    }

    const fn algorithm(self) -> Option<Algorithm> {
        match self {
            Self::English => Some(Algorithm::English),
            Self::German => Some(Algorithm::German),
            Self::None => None,
        }
    }

    const fn stop_words(self) -> &'static [&'static str] {
        match self {
            Self::English => ENGLISH_STOP_WORDS,
            Self::German => GERMAN_STOP_WORDS,
            Self::None => &[],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns text into normalised search terms for one language.
pub struct Analyzer {
    language: Language,
    stemmer: Option<Stemmer>,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            stemmer: language.algorithm().map(Stemmer::create),
        }
    }

    pub const fn language(&self) -> Language {
        self.language
    }

    /// Tokenizes text into searchable terms with stemming and case-aware splitting.
    ///
    /// Splits on several boundaries at once:
    /// - **CamelCase**: "generateDijkstraQuestion" → ["generate", "Dijkstra", "Question", "generateDijkstraQuestion"]
    /// - **snake_case**: "bellman_ford" → ["bellman", "ford"]
    /// - **dotted paths**: "ShortestPaths.dijkstra" → ["Shortest", "Paths", "ShortestPaths", "dijkstra"]
    ///
    /// Two pointers track the state: `word_start` marks the start of the complete
    /// alphabetic run, `subword_start` the start of the current component. That
    /// lets both the components and the compound be emitted.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = vec![];

        let mut last_case = None; // None for non-letters, Some(is_uppercase) otherwise
        let mut word_start = 0;
        let mut subword_start = 0;
        let mut word_start_next_char = true;
        let mut subword_start_next_char = true;

        for (i, c) in text.char_indices() {
            if word_start_next_char {
                word_start = i;
                subword_start = i;
                word_start_next_char = false;
                subword_start_next_char = false;
            }

            if subword_start_next_char {
                subword_start = i;
                subword_start_next_char = false;
            }

            let current_case = c.is_alphabetic().then(|| c.is_uppercase());
            let case_change = last_case == Some(false) && current_case == Some(true);
            last_case = current_case;

            if c == '-' || c == '_' {
                if i.saturating_sub(subword_start) >= MIN_TOKEN_LENGTH {
                    self.push_token(&text[subword_start..i], &mut tokens);
                }
                subword_start_next_char = true;
            } else if !c.is_alphabetic() {
                // End of the whole word: emit the trailing component, then the compound
                if i.saturating_sub(subword_start) >= MIN_TOKEN_LENGTH && subword_start != word_start
                {
                    self.push_token(&text[subword_start..i], &mut tokens);
                }
                if i.saturating_sub(word_start) >= MIN_TOKEN_LENGTH {
                    self.push_token(&text[word_start..i], &mut tokens);
                }
                word_start_next_char = true;
            } else if case_change {
                if i.saturating_sub(subword_start) >= MIN_TOKEN_LENGTH {
                    self.push_token(&text[subword_start..i], &mut tokens);
                }
                subword_start = i;
            }
        }

        if !word_start_next_char {
            let last_subword = &text[subword_start..];
            if word_start != subword_start && last_subword.len() >= MIN_TOKEN_LENGTH {
                self.push_token(last_subword, &mut tokens);
            }
            let last_word = &text[word_start..];
            if last_word.len() >= MIN_TOKEN_LENGTH {
                self.push_token(last_word, &mut tokens);
            }
        }

        tokens
    }

    /// Lowercase, drop stop words, stem.
    fn push_token(&self, token: &str, tokens: &mut Vec<String>) {
        let lowercase = token.to_lowercase();

        // `_` and `-` delimit subwords but stay inside the compound slice
        let lowercase = if lowercase.contains(['_', '-']) {
            lowercase.replace(['_', '-'], "")
        } else {
            lowercase
        };
        if lowercase.is_empty() || self.language.stop_words().contains(&lowercase.as_str()) {
            return;
        }

        match &self.stemmer {
            Some(stemmer) => tokens.push(stemmer.stem(&lowercase).into_owned()),
            None => tokens.push(lowercase),
        }
    }
}

/// Hashes a term for index lookup.
///
/// xxh3 is used rather than a randomly keyed hasher so that hashes are stable
/// across processes and the persisted index stays valid.
pub(crate) fn hash_term(term: &str) -> u64 {
    xxhash_rust::xxh3::xxh3_64(term.to_lowercase().as_bytes())
}
