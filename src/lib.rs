//! Recipe-Ripple: a polite recipe page discoverer
//!
//! This crate implements a breadth-first web crawler that finds recipe pages,
//! turns every fetched page into a fixed-schema feature vector for a
//! pretrained classifier, and ranks pages against a structured
//! title-plus-ingredients query.

pub mod classifier;
pub mod config;
pub mod crawler;
pub mod document;
pub mod features;
pub mod output;
pub mod scoring;
pub mod state;
pub mod storage;
pub mod text;
pub mod url;

use thiserror::Error;

/// Main error type for Recipe-Ripple operations
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Classifier error: {0}")]
    Classifier(#[from] classifier::ClassifierError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RippleError {
    /// Returns true if the error only affects a single URL and the crawl may continue
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::Parse { .. } | Self::UrlError(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Recipe-Ripple operations
pub type Result<T> = std::result::Result<T, RippleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use classifier::{Classifier, LinearModel};
pub use config::Config;
pub use crawler::CrawlSession;
pub use document::PageDocument;
pub use features::{extract_features, FeatureVector};
pub use output::{aggregate, CrawlResult, RankedPage};
pub use scoring::{score, MatchScore, SearchQuery};
pub use state::PageState;
pub use text::normalize;
pub use url::{extract_domain, normalize_url};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_and_parse_errors_are_recoverable() {
        let fetch = RippleError::Fetch {
            url: "https://example.com/".to_string(),
            message: "HTTP 404".to_string(),
        };
        let parse = RippleError::Parse {
            url: "https://example.com/".to_string(),
            message: "empty body".to_string(),
        };
        assert!(fetch.is_recoverable());
        assert!(parse.is_recoverable());
    }

    #[test]
    fn test_model_unavailable_is_fatal() {
        let err = RippleError::from(classifier::ClassifierError::ModelUnavailable(
            "model.json not found".to_string(),
        ));
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("model.json"));
    }
}
