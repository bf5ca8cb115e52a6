//! Output module for crawl results and reports
//!
//! This module handles:
//! - Ranking accepted pages into the final crawl result
//! - Appending feature rows to the training CSV
//! - Generating markdown reports of crawl results
//! - Collecting and printing crawl statistics

mod aggregate;
mod features;
mod markdown;
pub mod stats;

pub use aggregate::{aggregate, CrawlResult, RankedPage};
pub use features::FeatureWriter;
pub use markdown::{format_markdown_report, write_markdown_report};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
