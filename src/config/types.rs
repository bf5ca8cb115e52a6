use crate::scoring::{SearchQuery, DEFAULT_THRESHOLD};
use serde::Deserialize;

/// Main configuration structure for Recipe-Ripple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub search: Option<SearchConfig>,
    #[serde(default)]
    pub classifier: Option<ClassifierConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How fetched pages are accepted into the results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateMode {
    /// Accept pages the classifier labels as recipes
    Discovery,
    /// Accept pages whose relevance score reaches the threshold
    Search,
    /// Accept pages that pass both gates
    Both,
}

impl GateMode {
    /// Returns true if this mode consults the classifier
    pub fn uses_classifier(&self) -> bool {
        matches!(self, Self::Discovery | Self::Both)
    }

    /// Returns true if this mode consults the relevance scorer
    pub fn uses_scorer(&self) -> bool {
        matches!(self, Self::Search | Self::Both)
    }
}

fn default_mode() -> GateMode {
    GateMode::Discovery
}

fn default_link_farm_ratio() -> f64 {
    0.5
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_timeout_secs() -> u64 {
    10
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URLs the crawl starts from (depth 0)
    pub seeds: Vec<String>,

    /// Maximum link depth from a seed URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of pages fetched in one run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Fixed delay between successive fetches (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Anchor-to-word ratio above which a page is treated as a link farm
    #[serde(rename = "link-farm-ratio", default = "default_link_farm_ratio")]
    pub link_farm_ratio: f64,

    /// Keep exploring links found on link-farm pages
    #[serde(rename = "follow-link-farm-links", default)]
    pub follow_link_farm_links: bool,

    /// Wall-clock limit for the crawl in seconds (0 disables the deadline)
    #[serde(rename = "max-duration-secs", default)]
    pub max_duration_secs: u64,

    /// Which gate decides acceptance
    #[serde(default = "default_mode")]
    pub mode: GateMode,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Structured recipe query used by the relevance gate
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Target recipe title
    #[serde(default)]
    pub title: String,

    /// Ingredients the recipe should contain
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Minimum final score for a page to match
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl SearchConfig {
    /// Builds the query this section describes
    pub fn query(&self) -> SearchQuery {
        SearchQuery::new(self.title.clone(), self.ingredients.clone())
    }
}

/// Classifier artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Path to the JSON model artifact
    #[serde(rename = "model-path")]
    pub model_path: String,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file (enables run history)
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,

    /// Path to the append-only feature CSV file
    #[serde(rename = "features-path", default)]
    pub features_path: Option<String>,

    /// Path to the markdown report file
    #[serde(rename = "report-path", default)]
    pub report_path: Option<String>,

    /// Skip URLs already visited by previous runs recorded in the database
    #[serde(default)]
    pub incremental: bool,
}
