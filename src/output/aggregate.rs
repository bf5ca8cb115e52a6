use crate::output::stats::CrawlStatistics;
use crate::scoring::MatchScore;
use crate::storage::MatchRecord;
use serde::Serialize;

/// An accepted page with its ranking score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPage {
    pub url: String,

    /// Ranking key: the final relevance score, or 1.0 for classifier-only acceptance
    pub score: f64,

    /// Depth at which the page was found
    pub depth: u32,

    /// Display title of the page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Relevance breakdown (search and both modes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<MatchScore>,

    /// Classifier decision (discovery and both modes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_recipe: Option<bool>,
}

impl RankedPage {
    /// Converts the page into its persisted form
    pub fn to_match_record(&self) -> MatchRecord {
        MatchRecord {
            url: self.url.clone(),
            score: self.score,
            title_match: self.detail.map(|d| d.title_match),
            ingredients_match: self.detail.map(|d| d.ingredients_match),
            content_match: self.detail.map(|d| d.content_match),
            is_recipe: self.is_recipe,
        }
    }
}

/// Final output of a crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    /// Accepted pages, best first
    pub pages: Vec<RankedPage>,

    /// What happened during the crawl
    pub statistics: CrawlStatistics,
}

impl CrawlResult {
    /// Attaches the statistics collected by the crawl
    pub fn with_statistics(mut self, statistics: CrawlStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    /// Serializes the ranked pages as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.pages)
    }
}

/// Ranks accepted pages by score, highest first
///
/// The sort is stable, so pages with equal scores keep discovery order.
pub fn aggregate(mut accepted: Vec<RankedPage>) -> CrawlResult {
    accepted.sort_by(|a, b| b.score.total_cmp(&a.score));

    CrawlResult {
        pages: accepted,
        statistics: CrawlStatistics::default(),
    }
}
