//! Logistic-regression artifact

use crate::classifier::{Classifier, ClassifierError, ClassifierResult};
use crate::features::{FeatureVector, FEATURE_COUNT};
use serde::Deserialize;
use std::path::Path;

fn default_threshold() -> f64 {
    0.5
}

/// On-disk model format
#[derive(Debug, Clone, Deserialize)]
struct ModelArtifact {
    columns: Vec<String>,
    weights: Vec<f64>,
    intercept: f64,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

/// A pretrained linear model: `sigmoid(w · x + b) >= threshold`
#[derive(Debug, Clone)]
pub struct LinearModel {
    weights: [f64; FEATURE_COUNT],
    intercept: f64,
    threshold: f64,
}

impl LinearModel {
    /// Builds a model directly from weights in [`FeatureVector::COLUMNS`] order
    pub fn new(weights: [f64; FEATURE_COUNT], intercept: f64, threshold: f64) -> Self {
        Self {
            weights,
            intercept,
            threshold,
        }
    }

    /// Loads a model artifact from a JSON file
    ///
    /// The artifact must list exactly the columns of [`FeatureVector::COLUMNS`],
    /// in the same order.
    ///
    /// # Returns
    ///
    /// * `Ok(LinearModel)` - Successfully loaded model
    /// * `Err(ClassifierError::ModelUnavailable)` - Missing, unreadable, or incompatible artifact
    pub fn load(path: &Path) -> ClassifierResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClassifierError::ModelUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;

        Self::from_json(&content).map_err(|e| match e {
            ClassifierError::ModelUnavailable(msg) => {
                ClassifierError::ModelUnavailable(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parses a model artifact from its JSON text
    pub fn from_json(content: &str) -> ClassifierResult<Self> {
        let artifact: ModelArtifact = serde_json::from_str(content)
            .map_err(|e| ClassifierError::ModelUnavailable(format!("malformed artifact: {}", e)))?;

        if artifact.columns.len() != FEATURE_COUNT
            || artifact
                .columns
                .iter()
                .zip(FeatureVector::COLUMNS.iter())
                .any(|(found, expected)| found != expected)
        {
            return Err(ClassifierError::ModelUnavailable(format!(
                "artifact columns {:?} do not match the feature schema",
                artifact.columns
            )));
        }

        let weights: [f64; FEATURE_COUNT] = artifact.weights.as_slice().try_into().map_err(|_| {
            ClassifierError::ModelUnavailable(format!(
                "expected {} weights, found {}",
                FEATURE_COUNT,
                artifact.weights.len()
            ))
        })?;

        if !weights.iter().all(|w| w.is_finite()) || !artifact.intercept.is_finite() {
            return Err(ClassifierError::ModelUnavailable(
                "artifact contains non-finite coefficients".to_string(),
            ));
        }

        Ok(Self::new(weights, artifact.intercept, artifact.threshold))
    }

    /// Probability that the page is a recipe page
    pub fn probability(&self, features: &FeatureVector) -> ClassifierResult<f64> {
        let row = features.to_row();
        if let Some(index) = row.iter().position(|v| !v.is_finite()) {
            return Err(ClassifierError::InvalidInput(format!(
                "{} is not finite for {}",
                FeatureVector::COLUMNS[index],
                features.url
            )));
        }

        let z = self.intercept
            + self
                .weights
                .iter()
                .zip(row.iter())
                .map(|(w, x)| w * x)
                .sum::<f64>();

        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

impl Classifier for LinearModel {
    fn predict(&self, features: &FeatureVector) -> ClassifierResult<bool> {
        Ok(self.probability(features)? >= self.threshold)
    }
}
