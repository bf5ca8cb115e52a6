//! TF-IDF vectorization and cosine similarity
//!
//! The vectorizer is refit for every comparison: a call to
//! [`TfidfVectorizer::fit_transform`] builds a vocabulary from exactly the
//! documents it is given, so no state is shared across calls.

use crate::text::stopwords::is_stop_word;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Tokens are runs of two or more word characters
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Default vocabulary cap
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// A sparse, L2-normalized TF-IDF vector keyed by term
pub type SparseVector = HashMap<String, f64>;

/// TF-IDF vectorizer configuration
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    /// Smallest and largest n-gram size (inclusive)
    pub ngram_range: (usize, usize),

    /// Drop English stop words before building n-grams
    pub remove_stop_words: bool,

    /// Keep only the most frequent terms across the fitted corpus
    pub max_features: Option<usize>,
}

impl Default for TfidfVectorizer {
    /// Unigrams and bigrams, English stop words removed, 5000 terms max
    fn default() -> Self {
        Self {
            ngram_range: (1, 2),
            remove_stop_words: true,
            max_features: Some(DEFAULT_MAX_FEATURES),
        }
    }
}

impl TfidfVectorizer {
    /// Splits a document into the analyzed terms (n-grams) it contributes
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let lowered = document.to_lowercase();
        let tokens: Vec<&str> = TOKEN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !self.remove_stop_words || !is_stop_word(t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n.max(1)..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Fits a vocabulary on `documents` and returns one normalized vector per document
    ///
    /// IDF is smoothed: `ln((1 + n) / (1 + df)) + 1`. Returns all-empty vectors
    /// when the corpus has no terms left after analysis.
    pub fn fit_transform(&self, documents: &[&str]) -> Vec<SparseVector> {
        let analyzed: Vec<Vec<String>> = documents.iter().map(|d| self.analyze(d)).collect();

        // Corpus-wide counts and document frequencies
        let mut corpus_counts: HashMap<&str, usize> = HashMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for terms in &analyzed {
            let mut seen = HashSet::new();
            for term in terms {
                *corpus_counts.entry(term.as_str()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        let vocabulary = self.limit_vocabulary(&corpus_counts);
        let n_docs = documents.len() as f64;

        analyzed
            .iter()
            .map(|terms| {
                let mut vector: SparseVector = HashMap::new();
                for term in terms {
                    if vocabulary.contains(term.as_str()) {
                        *vector.entry(term.clone()).or_insert(0.0) += 1.0;
                    }
                }

                for (term, weight) in vector.iter_mut() {
                    let df = document_frequency.get(term.as_str()).copied().unwrap_or(0) as f64;
                    let idf = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;
                    *weight *= idf;
                }

                l2_normalize(&mut vector);
                vector
            })
            .collect()
    }

    /// Fits on exactly two documents and returns their cosine similarity
    pub fn similarity(&self, left: &str, right: &str) -> f64 {
        if left.trim().is_empty() || right.trim().is_empty() {
            return 0.0;
        }
        let vectors = self.fit_transform(&[left, right]);
        cosine_similarity(&vectors[0], &vectors[1])
    }

    fn limit_vocabulary<'a>(&self, counts: &HashMap<&'a str, usize>) -> HashSet<&'a str> {
        let mut terms: Vec<(&'a str, usize)> = counts.iter().map(|(t, c)| (*t, *c)).collect();

        if let Some(limit) = self.max_features {
            if terms.len() > limit {
                // Most frequent first, ties broken alphabetically for determinism
                terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                terms.truncate(limit);
            }
        }

        terms.into_iter().map(|(t, _)| t).collect()
    }
}

fn l2_normalize(vector: &mut SparseVector) {
    let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for weight in vector.values_mut() {
            *weight /= norm;
        }
    }
}

/// Cosine similarity of two L2-normalized vectors, clamped to `[0, 1]`
pub fn cosine_similarity(left: &SparseVector, right: &SparseVector) -> f64 {
    let (small, large) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };

    let dot: f64 = small
        .iter()
        .filter_map(|(term, w)| large.get(term).map(|other| w * other))
        .sum();

    dot.clamp(0.0, 1.0)
}
