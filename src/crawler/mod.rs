//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and outcome classification
//! - Link extraction from parsed pages
//! - The breadth-first frontier
//! - The crawl session that ties fetching, gating and ranking together

mod fetcher;
mod frontier;
mod links;
mod session;

pub use fetcher::{build_http_client, fetch_url, FetchOutcome, Fetcher};
pub use frontier::{Frontier, FrontierEntry};
pub use links::extract_links;
pub use session::{CrawlSession, CrawlSettings, StopReason};

use crate::classifier::{Classifier, LinearModel};
use crate::config::Config;
use crate::output::{CrawlResult, FeatureWriter};
use crate::storage::{open_storage, Storage};
use crate::RippleError;
use std::path::Path;
use url::Url;

/// Loads the classifier configured in `[classifier]`, if any
///
/// A configured model that cannot be loaded is an error, never a silent
/// fallback.
pub fn load_classifier(config: &Config) -> Result<Option<Box<dyn Classifier>>, RippleError> {
    match &config.classifier {
        Some(classifier) => {
            let model = LinearModel::load(Path::new(&classifier.model_path))?;
            tracing::info!("Loaded classifier from {}", classifier.model_path);
            Ok(Some(Box::new(model)))
        }
        None => Ok(None),
    }
}

/// Builds a crawl session from a configuration
///
/// Wires in every sink the configuration enables: the classifier, the search
/// query, SQLite run history (with the visited set of earlier runs when the
/// crawl is incremental) and the feature CSV.
pub fn build_session(config: &Config, config_hash: &str) -> Result<CrawlSession, RippleError> {
    let fetcher = Fetcher::new(&config.user_agent)?;
    let classifier = if config.crawler.mode.uses_classifier() {
        load_classifier(config)?
    } else {
        None
    };
    let query = config.search.as_ref().map(|s| s.query());

    let mut session = CrawlSession::new(
        CrawlSettings::from_config(config),
        &config.crawler.seeds,
        fetcher,
        classifier,
        query,
    )?;

    if let Some(path) = &config.output.database_path {
        let storage = open_storage(Path::new(path))?;
        if config.output.incremental {
            session = session.with_visited(storage.load_visited_urls()?);
        }
        session = session.with_storage(Box::new(storage), config_hash)?;
    }

    if let Some(path) = &config.output.features_path {
        session = session.with_feature_writer(FeatureWriter::open(Path::new(path))?);
    }

    Ok(session)
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Load the classifier and query the mode needs
/// 2. Open storage and the feature file when configured
/// 3. Crawl breadth-first from the seeds
/// 4. Return the accepted pages ranked by score
pub async fn run_crawl(config: &Config, config_hash: &str) -> Result<CrawlResult, RippleError> {
    build_session(config, config_hash)?.run().await
}

/// Fetches one URL and returns the final URL and HTML body
///
/// Used by the commands that work on a fixed URL list instead of crawling.
/// Any unsuccessful outcome becomes a recoverable fetch error.
pub async fn fetch_body(fetcher: &Fetcher, url: &Url) -> Result<(Url, String), RippleError> {
    match fetcher.fetch(url).await {
        FetchOutcome::Success {
            final_url, body, ..
        } => Ok((final_url, body)),
        failure => Err(RippleError::Fetch {
            url: url.to_string(),
            message: failure.failure_message().unwrap_or_default(),
        }),
    }
}
