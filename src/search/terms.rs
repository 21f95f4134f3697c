//! TF-IDF inverted index over index entries.

use crate::index::SearchIndex;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::tokenize::{Analyzer, Language, hash_term};

/// Term hash for fast lookup
type TermHash = u64;

/// Weight of title terms relative to body terms.
const TITLE_WEIGHT: f32 = 2.0;
const TEXT_WEIGHT: f32 = 1.0;

/// A searchable term index with TF-IDF scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedIndex {
    /// Map from term hash to (entry position, tf_idf_score) pairs, sorted by score descending
    terms: HashMap<TermHash, Vec<(u32, f32)>>,
    /// Number of entries the index was built from
    documents: usize,
    /// Analyzer language; queries must be tokenized the same way
    language: Language,
}

impl RankedIndex {
    /// Build the index for every entry of `index`.
    pub fn build(index: &SearchIndex, language: Language) -> Self {
        let mut builder = TermBuilder::new(language, index.len());
        for (position, entry) in index.iter().enumerate() {
            builder.add_terms(&entry.title, position, TITLE_WEIGHT);
            builder.add_terms(&entry.text, position, TEXT_WEIGHT);
        }
        builder.finalize()
    }

    /// Searches for entries matching the query, highest score first.
    ///
    /// The query is tokenized and stemmed just like indexed terms, and scores of
    /// entries matching several query terms are summed. Equal scores keep index order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<(usize, f32)> {
        let analyzer = Analyzer::new(self.language);
        let tokens = analyzer.tokenize(query);

        if tokens.is_empty() {
            return vec![];
        }

        let mut combined_scores: AHashMap<u32, f32> = AHashMap::new();
        for token in &tokens {
            if let Some(postings) = self.terms.get(&hash_term(token)) {
                for (position, score) in postings {
                    *combined_scores.entry(*position).or_insert(0.0) += score;
                }
            }
        }

        let mut results: Vec<_> = combined_scores.into_iter().collect();
        results.sort_by(|(pa, a), (pb, b)| b.total_cmp(a).then(pa.cmp(pb)));

        results
            .into_iter()
            .take(limit)
            .map(|(position, score)| (position as usize, score))
            .collect()
    }

    /// Get the number of unique terms in the index
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Get the number of documents in the index
    pub const fn document_count(&self) -> usize {
        self.documents
    }

    pub const fn language(&self) -> Language {
        self.language
    }
}

/// Accumulates term frequencies before TF-IDF finalization.
struct TermBuilder {
    /// Flat map from (term_hash, position) → raw TF score
    term_docs: AHashMap<(TermHash, u32), f32>,
    /// Total term count per entry, for length normalisation
    doc_lengths: Vec<usize>,
    analyzer: Analyzer,
}

impl TermBuilder {
    fn new(language: Language, documents: usize) -> Self {
        Self {
            term_docs: AHashMap::new(),
            doc_lengths: vec![0; documents],
            analyzer: Analyzer::new(language),
        }
    }

    /// TF score = term_count * base_score
    fn add_terms(&mut self, text: &str, position: usize, base_score: f32) {
        let words = self.analyzer.tokenize(text);

        let mut word_counts: AHashMap<String, usize> = AHashMap::with_capacity(words.len());
        for word in words {
            *word_counts.entry(word).or_insert(0) += 1;
        }

        self.doc_lengths[position] += word_counts.values().sum::<usize>();

        let position = u32::try_from(position).unwrap_or(u32::MAX);
        for (word, count) in word_counts {
            *self
                .term_docs
                .entry((hash_term(&word), position))
                .or_insert(0.0) += (count as f32) * base_score;
        }
    }

    /// Calculates IDF and produces the final index.
    ///
    /// score = ln(1 + tf_normalized) * ln(total_docs / doc_freq), where
    /// tf_normalized = tf / max(doc_length / avg_doc_length, 0.5).
    fn finalize(self) -> RankedIndex {
        let start = std::time::Instant::now();
        let documents = self.doc_lengths.len();
        let total_docs = documents as f32;

        let non_empty: Vec<usize> = self.doc_lengths.iter().copied().filter(|&l| l > 0).collect();
        let avg_doc_length = if non_empty.is_empty() {
            1.0
        } else {
            non_empty.iter().sum::<usize>() as f32 / non_empty.len() as f32
        };

        let total_term_doc_pairs = self.term_docs.len();
        let mut grouped: HashMap<TermHash, Vec<(u32, f32)>> = HashMap::new();
        for ((term_hash, position), tf_score) in self.term_docs {
            grouped
                .entry(term_hash)
                .or_default()
                .push((position, tf_score));
        }

        let mut terms: HashMap<TermHash, Vec<(u32, f32)>> = HashMap::with_capacity(grouped.len());
        for (term_hash, doc_scores) in grouped {
            let doc_freq = doc_scores.len() as f32;
            let idf = (total_docs / doc_freq).ln();

            let mut scored: Vec<(u32, f32)> = doc_scores
                .into_iter()
                .map(|(position, tf_score)| {
                    let doc_length = self.doc_lengths[position as usize].max(1) as f32;
                    let length_norm = (doc_length / avg_doc_length).max(0.5);
                    let tf_normalized = tf_score / length_norm;
                    (position, tf_normalized.ln_1p() * idf)
                })
                .collect();

            scored.sort_by(|(pa, a), (pb, b)| b.total_cmp(a).then(pa.cmp(pb)));
            terms.insert(term_hash, scored);
        }

        let index = RankedIndex {
            terms,
            documents,
            language: self.analyzer.language(),
        };

        tracing::info!(
            "Built ranked index: {} unique terms, {} documents, {} term-document pairs in {:?}",
            index.term_count(),
            index.document_count(),
            total_term_doc_pairs,
            start.elapsed()
        );

        index
    }
}
