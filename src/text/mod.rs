//! Text handling module
//!
//! This module provides the text primitives shared by feature extraction and
//! relevance scoring:
//! - Normalization (lowercase, punctuation stripping, whitespace collapsing)
//! - English stop words
//! - TF-IDF vectorization and cosine similarity

mod normalize;
mod stopwords;
pub mod tfidf;

pub use normalize::normalize;
pub use stopwords::is_stop_word;
pub use tfidf::{cosine_similarity, TfidfVectorizer};
