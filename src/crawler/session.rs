//! Crawl session - the breadth-first traversal loop
//!
//! A session owns everything one crawl needs:
//! - The frontier and its seen set
//! - The fetcher
//! - The gates (classifier and/or relevance query)
//! - The accepted pages and live statistics
//! - Optional sinks (feature CSV, SQLite run history)
//!
//! Parsed documents are not `Send`, so every page is turned into features,
//! a gate decision and a link list inside a synchronous step. Only the fetch
//! and the politeness delay are awaited.

use crate::classifier::Classifier;
use crate::config::{Config, GateMode};
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::links::extract_links;
use crate::document::PageDocument;
use crate::features::extract_features;
use crate::output::{aggregate, CrawlResult, CrawlStatistics, FeatureWriter, RankedPage};
use crate::scoring::{score, SearchQuery, DEFAULT_THRESHOLD};
use crate::state::PageState;
use crate::storage::{PageVisit, RunStatus, Storage};
use crate::url::{extract_domain, normalize_url};
use crate::{ConfigError, RippleError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Traversal limits and gate settings for one session
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub max_depth: u32,
    pub max_pages: u32,
    pub request_delay: Duration,
    pub link_farm_ratio: f64,
    pub follow_link_farm_links: bool,
    pub max_duration: Option<Duration>,
    pub mode: GateMode,
    pub threshold: f64,
}

impl CrawlSettings {
    /// Extracts the session settings from a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        let crawler = &config.crawler;
        Self {
            max_depth: crawler.max_depth,
            max_pages: crawler.max_pages,
            request_delay: Duration::from_millis(crawler.request_delay_ms),
            link_farm_ratio: crawler.link_farm_ratio,
            follow_link_farm_links: crawler.follow_link_farm_links,
            max_duration: (crawler.max_duration_secs > 0)
                .then(|| Duration::from_secs(crawler.max_duration_secs)),
            mode: crawler.mode,
            threshold: config
                .search
                .as_ref()
                .map_or(DEFAULT_THRESHOLD, |s| s.threshold),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 100,
            request_delay: Duration::from_secs(1),
            link_farm_ratio: 0.5,
            follow_link_farm_links: false,
            max_duration: None,
            mode: GateMode::Search,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Why the crawl loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    FrontierExhausted,
    PageLimit,
    Deadline,
    Cancelled,
}

/// What a processed page contributes to the crawl
struct PageOutcome {
    state: PageState,
    title: Option<String>,
    accepted: Option<RankedPage>,
    links: Vec<Url>,
}

/// One breadth-first crawl
pub struct CrawlSession {
    settings: CrawlSettings,
    seeds: Vec<Url>,
    frontier: Frontier,
    fetcher: Fetcher,
    classifier: Option<Box<dyn Classifier>>,
    query: Option<SearchQuery>,
    accepted: Vec<RankedPage>,
    statistics: CrawlStatistics,
    domains: HashSet<String>,
    pages_fetched: u32,
    stop: Arc<AtomicBool>,
    features: Option<FeatureWriter>,
    storage: Option<(Box<dyn Storage>, i64)>,
}

impl CrawlSession {
    /// Creates a session
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the gate mode needs a classifier or a
    /// query that was not supplied, or if no seed is a valid HTTP(S) URL.
    pub fn new(
        settings: CrawlSettings,
        seeds: &[String],
        fetcher: Fetcher,
        classifier: Option<Box<dyn Classifier>>,
        query: Option<SearchQuery>,
    ) -> Result<Self, RippleError> {
        if settings.mode.uses_classifier() && classifier.is_none() {
            return Err(ConfigError::Validation(format!(
                "mode {:?} requires a classifier",
                settings.mode
            ))
            .into());
        }

        if settings.mode.uses_scorer() && query.is_none() {
            return Err(ConfigError::Validation(format!(
                "mode {:?} requires a search query",
                settings.mode
            ))
            .into());
        }

        let seeds: Vec<Url> = seeds
            .iter()
            .filter_map(|seed| match normalize_url(seed) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!("Skipping invalid seed {}: {}", seed, e);
                    None
                }
            })
            .collect();

        if seeds.is_empty() {
            return Err(ConfigError::Validation("no valid seed URLs".to_string()).into());
        }

        Ok(Self {
            settings,
            seeds,
            frontier: Frontier::new(),
            fetcher,
            classifier,
            query,
            accepted: Vec::new(),
            statistics: CrawlStatistics::default(),
            domains: HashSet::new(),
            pages_fetched: 0,
            stop: Arc::new(AtomicBool::new(false)),
            features: None,
            storage: None,
        })
    }

    /// Pre-populates the seen set with URLs visited by earlier runs
    pub fn with_visited(mut self, visited: HashSet<String>) -> Self {
        tracing::info!("Skipping {} previously visited URLs", visited.len());
        self.frontier = Frontier::with_visited(visited);
        self
    }

    /// Appends the features of every extracted page to `writer`
    pub fn with_feature_writer(mut self, writer: FeatureWriter) -> Self {
        self.features = Some(writer);
        self
    }

    /// Records the run, every page state and every match in `storage`
    pub fn with_storage(
        mut self,
        mut storage: Box<dyn Storage>,
        config_hash: &str,
    ) -> Result<Self, RippleError> {
        let mode = format!("{:?}", self.settings.mode).to_lowercase();
        let run_id = storage.create_run(config_hash, &mode)?;
        tracing::info!("Recording crawl run {}", run_id);
        self.storage = Some((storage, run_id));
        Ok(self)
    }

    /// Shared flag that stops the crawl at the next iteration boundary
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// ID of the storage run, if storage is enabled
    pub fn run_id(&self) -> Option<i64> {
        self.storage.as_ref().map(|(_, run_id)| *run_id)
    }

    /// Runs the crawl to completion and returns the ranked results
    ///
    /// Per-URL failures are logged and recorded; only classifier, storage and
    /// output failures abort the crawl.
    pub async fn run(mut self) -> Result<CrawlResult, RippleError> {
        let start = Instant::now();
        tracing::info!(
            "Starting crawl: {} seed(s), mode {:?}, max depth {}, max pages {}",
            self.seeds.len(),
            self.settings.mode,
            self.settings.max_depth,
            self.settings.max_pages
        );

        for seed in std::mem::take(&mut self.seeds) {
            self.frontier.push_seed(seed);
        }

        let outcome = self.crawl_loop(start).await;

        let status = match &outcome {
            Ok(StopReason::Cancelled) | Ok(StopReason::Deadline) => RunStatus::Interrupted,
            Ok(_) => RunStatus::Completed,
            Err(_) => RunStatus::Failed,
        };
        if let Some((storage, run_id)) = self.storage.as_mut() {
            storage.finish_run(*run_id, status)?;
        }

        let reason = outcome?;
        self.statistics.unique_domains = self.domains.len() as u64;
        self.statistics.duration_seconds = Some(start.elapsed().as_secs_f64());

        tracing::info!(
            "Crawl finished ({:?}): {} pages fetched, {} accepted in {:?}",
            reason,
            self.pages_fetched,
            self.accepted.len(),
            start.elapsed()
        );

        let statistics = std::mem::take(&mut self.statistics);
        Ok(aggregate(std::mem::take(&mut self.accepted)).with_statistics(statistics))
    }

    async fn crawl_loop(&mut self, start: Instant) -> Result<StopReason, RippleError> {
        loop {
            if self.stop.load(Ordering::Relaxed) {
                tracing::info!("Crawl cancelled");
                return Ok(StopReason::Cancelled);
            }

            if let Some(limit) = self.settings.max_duration {
                if start.elapsed() >= limit {
                    tracing::info!("Crawl deadline of {:?} reached", limit);
                    return Ok(StopReason::Deadline);
                }
            }

            if self.pages_fetched >= self.settings.max_pages {
                tracing::info!("Page limit of {} reached", self.settings.max_pages);
                return Ok(StopReason::PageLimit);
            }

            let Some(entry) = self.frontier.pop() else {
                tracing::info!("Frontier is empty, crawl complete");
                return Ok(StopReason::FrontierExhausted);
            };

            if entry.depth > self.settings.max_depth {
                continue;
            }

            if self.pages_fetched > 0 && !self.settings.request_delay.is_zero() {
                tokio::time::sleep(self.settings.request_delay).await;
            }

            self.frontier.claim(&entry.url);
            let outcome = self.fetcher.fetch(&entry.url).await;
            self.pages_fetched += 1;
            self.handle_fetch(&entry, outcome)?;

            if self.pages_fetched % 10 == 0 {
                let rate = self.pages_fetched as f64 / start.elapsed().as_secs_f64().max(1e-9);
                tracing::info!(
                    "Progress: {} pages fetched, {} accepted, {} in frontier, {:.2} pages/sec",
                    self.pages_fetched,
                    self.accepted.len(),
                    self.frontier.len(),
                    rate
                );
            }
        }
    }

    fn handle_fetch(&mut self, entry: &FrontierEntry, outcome: FetchOutcome) -> Result<(), RippleError> {
        let (final_url, status_code, body) = match outcome {
            FetchOutcome::Success {
                final_url,
                status_code,
                body,
                ..
            } => {
                let final_url = normalize_url(final_url.as_str()).unwrap_or(final_url);
                (final_url, status_code, body)
            }
            failure => {
                let state = failure.failure_state().unwrap_or(PageState::Failed);
                let message = failure.failure_message().unwrap_or_default();
                tracing::warn!("Failed to fetch {}: {}", entry.url, message);
                let status_code = match failure {
                    FetchOutcome::HttpError { status_code, .. } => Some(status_code),
                    _ => None,
                };
                return self.record(&entry.url, entry.depth, state, None, status_code, Some(&message));
            }
        };

        if final_url != entry.url && !self.frontier.claim(&final_url) {
            tracing::debug!("{} redirected to already fetched {}", entry.url, final_url);
            return self.record(
                &entry.url,
                entry.depth,
                PageState::Redirected,
                None,
                Some(status_code),
                None,
            );
        }

        let page = match self.process_page(final_url.clone(), &body) {
            Ok(page) => page,
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Failed to parse {}: {}", final_url, e);
                return self.record(
                    &final_url,
                    entry.depth,
                    PageState::ParseFailed,
                    None,
                    Some(status_code),
                    Some(&e.to_string()),
                );
            }
            Err(e) => return Err(e),
        };

        // A redirected page is recorded under the URL it was served from
        self.record(
            &final_url,
            entry.depth,
            page.state,
            page.title.as_deref(),
            Some(status_code),
            None,
        )?;

        if let Some(mut ranked) = page.accepted {
            ranked.depth = entry.depth;
            tracing::info!("Accepted {} (score {:.3})", ranked.url, ranked.score);
            if let Some((storage, run_id)) = self.storage.as_mut() {
                storage.record_match(*run_id, &ranked.to_match_record())?;
            }
            self.accepted.push(ranked);
        }

        self.enqueue_links(entry.depth, page.links)
    }

    /// Parses a body and runs the link-farm check, feature extraction and gates
    fn process_page(&mut self, url: Url, body: &str) -> Result<PageOutcome, RippleError> {
        let page = PageDocument::parse(url, body)?;
        let title = page
            .page_title()
            .map(str::to_string)
            .or_else(|| Some(page.title().to_string()).filter(|t| !t.is_empty()));

        let ratio = page.anchor_to_word_ratio();
        if ratio > self.settings.link_farm_ratio {
            tracing::debug!(
                "{} looks like a link farm (anchor/word ratio {:.2})",
                page.url(),
                ratio
            );
            let links = if self.settings.follow_link_farm_links {
                extract_links(page.dom(), page.url())
            } else {
                Vec::new()
            };
            return Ok(PageOutcome {
                state: PageState::LinkFarm,
                title,
                accepted: None,
                links,
            });
        }

        let features = extract_features(&page);
        if let Some(writer) = self.features.as_mut() {
            writer.append(page.url(), &features)?;
        }

        let is_recipe = match (&self.classifier, self.settings.mode.uses_classifier()) {
            (Some(classifier), true) => Some(classifier.predict(&features)?),
            _ => None,
        };

        let detail = match (&self.query, self.settings.mode.uses_scorer()) {
            (Some(query), true) if is_recipe != Some(false) => Some(score(&page, query)),
            _ => None,
        };

        let accepted = match self.settings.mode {
            GateMode::Discovery => is_recipe == Some(true),
            GateMode::Search => detail.map_or(false, |d| d.matches(self.settings.threshold)),
            GateMode::Both => {
                is_recipe == Some(true)
                    && detail.map_or(false, |d| d.matches(self.settings.threshold))
            }
        };

        tracing::debug!(
            "{}: is_recipe={:?} score={:?} accepted={}",
            page.url(),
            is_recipe,
            detail.map(|d| d.final_score),
            accepted
        );

        let ranked = accepted.then(|| RankedPage {
            url: page.url().to_string(),
            score: detail.map_or(1.0, |d| d.final_score),
            depth: 0,
            title: Some(page.title().to_string()).filter(|t| !t.is_empty()),
            detail,
            is_recipe,
        });

        Ok(PageOutcome {
            state: if accepted {
                PageState::Accepted
            } else {
                PageState::Processed
            },
            title,
            accepted: ranked,
            links: extract_links(page.dom(), page.url()),
        })
    }

    fn enqueue_links(&mut self, depth: u32, links: Vec<Url>) -> Result<(), RippleError> {
        let child_depth = depth + 1;

        for link in links {
            if self.frontier.has_seen(&link) {
                continue;
            }

            if child_depth > self.settings.max_depth {
                self.frontier.mark_seen(&link);
                self.record(&link, child_depth, PageState::DepthExceeded, None, None, None)?;
                continue;
            }

            self.frontier.push(link, child_depth);
        }

        Ok(())
    }

    fn record(
        &mut self,
        url: &Url,
        depth: u32,
        state: PageState,
        title: Option<&str>,
        status_code: Option<u16>,
        error_message: Option<&str>,
    ) -> Result<(), RippleError> {
        self.statistics.record(state, depth);

        let domain = extract_domain(url).unwrap_or_default();
        if state != PageState::DepthExceeded {
            self.domains.insert(domain.clone());
        }

        if let Some((storage, run_id)) = self.storage.as_mut() {
            storage.record_page(
                *run_id,
                &PageVisit {
                    url: url.as_str(),
                    domain: &domain,
                    depth,
                    state,
                    title,
                    status_code,
                    error_message,
                },
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierResult;
    use crate::config::UserAgentConfig;
    use crate::features::FeatureVector;

    struct AlwaysRecipe;

    impl Classifier for AlwaysRecipe {
        fn predict(&self, _features: &FeatureVector) -> ClassifierResult<bool> {
            Ok(true)
        }
    }

    fn fetcher() -> Fetcher {
        Fetcher::new(&UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/bot".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn seeds() -> Vec<String> {
        vec!["https://example.com/".to_string()]
    }

    fn settings(mode: GateMode) -> CrawlSettings {
        CrawlSettings {
            mode,
            request_delay: Duration::ZERO,
            ..CrawlSettings::default()
        }
    }

    #[test]
    fn test_missing_gates_are_rejected() {
        let no_classifier = CrawlSession::new(settings(GateMode::Discovery), &seeds(), fetcher(), None, None);
        assert!(matches!(no_classifier, Err(RippleError::Config(_))));

        let no_query = CrawlSession::new(
            settings(GateMode::Both),
            &seeds(),
            fetcher(),
            Some(Box::new(AlwaysRecipe)),
            None,
        );
        assert!(matches!(no_query, Err(RippleError::Config(_))));
    }

    #[test]
    fn test_invalid_seeds_are_rejected() {
        let result = CrawlSession::new(
            settings(GateMode::Search),
            &["mailto:chef@example.com".to_string()],
            fetcher(),
            None,
            Some(SearchQuery::default()),
        );
        assert!(matches!(result, Err(RippleError::Config(_))));
    }

    #[test]
    fn test_discovery_acceptance_scores_one() {
        let mut session = CrawlSession::new(
            settings(GateMode::Discovery),
            &seeds(),
            fetcher(),
            Some(Box::new(AlwaysRecipe)),
            None,
        )
        .unwrap();

        let body = "<h1>Tomato Soup</h1><p>Simmer the tomatoes for twenty minutes, then blend until smooth.</p>";
        let outcome = session
            .process_page(Url::parse("https://example.com/soup").unwrap(), body)
            .unwrap();

        assert_eq!(outcome.state, PageState::Accepted);
        let ranked = outcome.accepted.unwrap();
        assert_eq!(ranked.score, 1.0);
        assert_eq!(ranked.is_recipe, Some(true));
        assert!(ranked.detail.is_none());
    }

    #[test]
    fn test_link_farm_skips_gates() {
        let mut session = CrawlSession::new(
            settings(GateMode::Discovery),
            &seeds(),
            fetcher(),
            Some(Box::new(AlwaysRecipe)),
            None,
        )
        .unwrap();

        // 3 anchors, 5 words: ratio 0.6
        let body = r#"<a href="/a">one</a> <a href="/b">two</a> <a href="/c">three</a> four five"#;
        let outcome = session
            .process_page(Url::parse("https://example.com/links").unwrap(), body)
            .unwrap();

        assert_eq!(outcome.state, PageState::LinkFarm);
        assert!(outcome.accepted.is_none());
        assert!(outcome.links.is_empty());
    }

    #[test]
    fn test_link_farm_links_followed_when_enabled() {
        let mut session = CrawlSession::new(
            CrawlSettings {
                follow_link_farm_links: true,
                ..settings(GateMode::Discovery)
            },
            &seeds(),
            fetcher(),
            Some(Box::new(AlwaysRecipe)),
            None,
        )
        .unwrap();

        let body = r#"<a href="/a">one</a> <a href="/b">two</a> <a href="/c">three</a> four five"#;
        let outcome = session
            .process_page(Url::parse("https://example.com/links").unwrap(), body)
            .unwrap();

        assert_eq!(outcome.state, PageState::LinkFarm);
        assert_eq!(outcome.links.len(), 3);
    }

    #[test]
    fn test_search_gate_uses_threshold() {
        let query = SearchQuery::new("tomato soup", vec!["tomatoes".to_string()]);
        let mut session = CrawlSession::new(
            CrawlSettings {
                threshold: 0.99,
                ..settings(GateMode::Search)
            },
            &seeds(),
            fetcher(),
            None,
            Some(query),
        )
        .unwrap();

        let body = "<h1>Tomato Soup</h1><p>Simmer the tomatoes for twenty minutes, then blend until smooth.</p>";
        let outcome = session
            .process_page(Url::parse("https://example.com/soup").unwrap(), body)
            .unwrap();

        assert_eq!(outcome.state, PageState::Processed);
        assert!(outcome.accepted.is_none());
    }

    #[test]
    fn test_depth_exceeded_links_are_counted_once() {
        let mut session = CrawlSession::new(
            CrawlSettings {
                max_depth: 0,
                ..settings(GateMode::Search)
            },
            &seeds(),
            fetcher(),
            None,
            Some(SearchQuery::default()),
        )
        .unwrap();

        let link = Url::parse("https://example.com/deep").unwrap();
        session.enqueue_links(0, vec![link.clone()]).unwrap();
        session.enqueue_links(0, vec![link]).unwrap();

        assert!(session.frontier.is_empty());
        assert_eq!(session.statistics.count(PageState::DepthExceeded), 1);
    }
}
