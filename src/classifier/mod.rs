//! Classifier gate module
//!
//! The recipe classifier is an opaque, pretrained predicate over a
//! [`FeatureVector`]. The crawler only depends on the [`Classifier`] trait;
//! [`LinearModel`] is the bundled implementation loaded from a JSON artifact.

mod linear;

pub use linear::LinearModel;

use crate::features::FeatureVector;
use thiserror::Error;

/// Errors raised by the classifier gate
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid feature input: {0}")]
    InvalidInput(String),
}

/// Result type for classifier operations
pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Binary "is this a recipe page" predicate
///
/// Implementations must be deterministic: the same vector always yields the
/// same decision. Failures are reported, never mapped to `false`.
pub trait Classifier {
    /// Predicts whether the page described by `features` is a recipe page
    fn predict(&self, features: &FeatureVector) -> ClassifierResult<bool>;
}
