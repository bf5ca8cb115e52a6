//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use recipe_ripple::config::{
    ClassifierConfig, Config, CrawlerConfig, GateMode, OutputConfig, SearchConfig,
    UserAgentConfig,
};
use recipe_ripple::crawler::{build_session, run_crawl};
use recipe_ripple::features::FeatureVector;
use recipe_ripple::state::PageState;
use recipe_ripple::storage::{RunStatus, SqliteStorage, Storage};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILLER: &str = "This page shares kitchen notes, seasonal produce tips, stories from \
    the family table and plenty of advice for home cooks who like to plan their week ahead.";

/// Creates a test configuration crawling `seeds` in search mode
fn create_test_config(seeds: Vec<String>) -> Config {
    Config {
        crawler: CrawlerConfig {
            seeds,
            max_depth: 2,
            max_pages: 50,
            request_delay_ms: 0,
            link_farm_ratio: 0.5,
            follow_link_farm_links: false,
            max_duration_secs: 0,
            mode: GateMode::Search,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            timeout_secs: 5,
        },
        search: Some(SearchConfig {
            title: "chocolate chip cookies".to_string(),
            ingredients: vec![
                "flour".to_string(),
                "sugar".to_string(),
                "chocolate chips".to_string(),
            ],
            threshold: 0.4,
        }),
        classifier: None,
        output: OutputConfig::default(),
    }
}

/// A plain page with enough prose to stay clear of the link-farm heuristic
fn hub_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a> "#, href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><p>{}</p><nav>{}</nav></body></html>",
        title, FILLER, anchors
    )
}

fn cookie_page() -> String {
    format!(
        r#"<html>
        <head><title>Cookies | Test Kitchen</title></head>
        <body>
            <h1>Best Chocolate Chip Cookies</h1>
            <div class="recipe-content">
                <ul class="ingredients">
                    <li>2 cups flour</li>
                    <li>1 cup sugar</li>
                    <li>1 cup chocolate chips</li>
                </ul>
                <p>Mix the flour and sugar, fold in the chocolate chips and bake the cookies.</p>
                <p>{}</p>
            </div>
        </body>
        </html>"#,
        FILLER
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn hash() -> String {
    "test-config-hash".to_string()
}

#[tokio::test]
async fn test_full_crawl_ranks_matching_pages() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", hub_page("Home", &["/cookies", "/about"])).await;
    mount_page(&server, "/cookies", cookie_page()).await;
    mount_page(&server, "/about", hub_page("About us", &["/"])).await;

    let config = create_test_config(vec![base.clone()]);
    let result = run_crawl(&config, &hash()).await.expect("crawl failed");

    assert_eq!(result.pages.len(), 1, "only the cookie page should match");
    let top = &result.pages[0];
    assert_eq!(top.url, format!("{}/cookies", base));
    assert_eq!(top.depth, 1);
    assert!(top.score >= 0.4);
    let detail = top.detail.expect("search mode records the breakdown");
    assert_eq!(detail.title_match, 1.0);
    assert_eq!(detail.ingredients_match, 1.0);

    let stats = &result.statistics;
    assert_eq!(stats.pages_fetched, 3, "the link back to / must not be refetched");
    assert_eq!(stats.count(PageState::Accepted), 1);
    assert_eq!(stats.count(PageState::Processed), 2);
    assert_eq!(stats.unique_domains, 1);
}

#[tokio::test]
async fn test_dead_seed_does_not_stop_the_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/cookies", cookie_page()).await;

    let config = create_test_config(vec![format!("{}/gone", base), format!("{}/cookies", base)]);
    let result = run_crawl(&config, &hash()).await.expect("crawl failed");

    assert_eq!(result.statistics.count(PageState::DeadLink), 1);
    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.pages[0].url, format!("{}/cookies", base));
}

async fn mount_redirect(server: &MockServer, route: &str, target: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(301).insert_header("location", target))
        .mount(server)
        .await;
}

async fn fetch_count(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .expect("recording enabled")
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}

#[tokio::test]
async fn test_redirect_to_queued_page_is_processed_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", hub_page("Home", &["/old", "/cookies"])).await;
    mount_redirect(&server, "/old", "/cookies").await;
    mount_page(&server, "/cookies", cookie_page()).await;

    let config = create_test_config(vec![base.clone()]);
    let result = run_crawl(&config, &hash()).await.expect("crawl failed");

    let urls: Vec<_> = result.pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls, [format!("{}/cookies", base)]);
    assert_eq!(fetch_count(&server, "/cookies").await, 1);
    assert_eq!(result.statistics.count(PageState::Accepted), 1);
}

#[tokio::test]
async fn test_redirect_to_fetched_page_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", hub_page("Home", &["/cookies", "/old"])).await;
    mount_page(&server, "/cookies", cookie_page()).await;
    mount_redirect(&server, "/old", "/cookies").await;

    let config = create_test_config(vec![base.clone()]);
    let result = run_crawl(&config, &hash()).await.expect("crawl failed");

    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.pages[0].url, format!("{}/cookies", base));
    assert_eq!(result.statistics.count(PageState::Accepted), 1);
    assert_eq!(result.statistics.count(PageState::Redirected), 1);
}

#[tokio::test]
async fn test_non_200_seed_is_not_scored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(203).set_body_raw(cookie_page(), "text/html"))
        .mount(&server)
        .await;

    let config = create_test_config(vec![server.uri()]);
    let result = run_crawl(&config, &hash()).await.expect("crawl failed");

    assert!(result.pages.is_empty());
    assert_eq!(result.statistics.count(PageState::Failed), 1);
}

#[tokio::test]
async fn test_request_delay_separates_fetches() {
    let server = MockServer::start().await;

    mount_page(&server, "/", hub_page("Home", &["/a", "/b"])).await;
    mount_page(&server, "/a", hub_page("A", &[])).await;
    mount_page(&server, "/b", hub_page("B", &[])).await;

    let mut config = create_test_config(vec![server.uri()]);
    config.crawler.request_delay_ms = 150;

    let start = Instant::now();
    let result = run_crawl(&config, &hash()).await.expect("crawl failed");

    assert_eq!(result.statistics.pages_fetched, 3);
    // Three fetches, two gaps
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_first_fetch_is_not_delayed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", hub_page("Home", &[])).await;

    let mut config = create_test_config(vec![server.uri()]);
    config.crawler.request_delay_ms = 5_000;

    let start = Instant::now();
    let result = run_crawl(&config, &hash()).await.expect("crawl failed");

    assert_eq!(result.statistics.pages_fetched, 1);
    assert!(start.elapsed() < Duration::from_millis(5_000));
}

#[tokio::test]
async fn test_max_pages_limits_fetches() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", hub_page("Home", &["/a", "/b", "/c", "/d"])).await;
    for route in ["/a", "/b", "/c", "/d"] {
        mount_page(&server, route, hub_page(route, &[])).await;
    }

    let mut config = create_test_config(vec![base]);
    config.crawler.max_pages = 3;
    let result = run_crawl(&config, &hash()).await.expect("crawl failed");

    assert_eq!(result.statistics.pages_fetched, 3);
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 3);
    // Breadth-first: the seed, then its links in document order
    let paths: Vec<_> = requests.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(paths, ["/", "/a", "/b"]);
}

#[tokio::test]
async fn test_links_beyond_max_depth_are_not_fetched() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", hub_page("Home", &["/level1"])).await;
    mount_page(&server, "/level1", hub_page("Level 1", &["/level2"])).await;
    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html(cookie_page()))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(vec![base]);
    config.crawler.max_depth = 1;
    let result = run_crawl(&config, &hash()).await.expect("crawl failed");

    assert_eq!(result.statistics.pages_fetched, 2);
    assert_eq!(result.statistics.count(PageState::DepthExceeded), 1);
    assert!(result.pages.is_empty());
}

#[tokio::test]
async fn test_link_farm_is_excluded_and_not_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    let farm: String = (0..30)
        .map(|i| format!(r#"<a href="/spam{}">x</a>"#, i))
        .chain(std::iter::once(r#"<a href="/cookies">cookies</a>"#.to_string()))
        .collect();
    mount_page(&server, "/", format!("<html><body>{}</body></html>", farm)).await;
    Mock::given(method("GET"))
        .and(path("/cookies"))
        .respond_with(html(cookie_page()))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(vec![base]);
    let result = run_crawl(&config, &hash()).await.expect("crawl failed");

    assert_eq!(result.statistics.pages_fetched, 1);
    assert_eq!(result.statistics.count(PageState::LinkFarm), 1);
    assert!(result.pages.is_empty());
}

#[tokio::test]
async fn test_discovery_mode_uses_classifier() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    // Only pages carrying JSON-LD are classified as recipes
    let weights: Vec<f64> = FeatureVector::COLUMNS
        .iter()
        .map(|column| if *column == "has_schema_recipe" { 10.0 } else { 0.0 })
        .collect();
    let model_path = dir.path().join("model.json");
    std::fs::write(
        &model_path,
        serde_json::json!({
            "columns": FeatureVector::COLUMNS,
            "weights": weights,
            "intercept": -5.0,
        })
        .to_string(),
    )
    .unwrap();

    let recipe = format!(
        r#"<html><head><script type="application/ld+json">{{"@type":"Recipe"}}</script></head>
        <body><h1>Lentil Soup</h1><p>{}</p></body></html>"#,
        FILLER
    );
    mount_page(&server, "/", hub_page("Home", &["/soup"])).await;
    mount_page(&server, "/soup", recipe).await;

    let mut config = create_test_config(vec![base.clone()]);
    config.crawler.mode = GateMode::Discovery;
    config.search = None;
    config.classifier = Some(ClassifierConfig {
        model_path: model_path.to_string_lossy().into_owned(),
    });

    let result = run_crawl(&config, &hash()).await.expect("crawl failed");

    assert_eq!(result.pages.len(), 1);
    let page = &result.pages[0];
    assert_eq!(page.url, format!("{}/soup", base));
    assert_eq!(page.score, 1.0);
    assert_eq!(page.is_recipe, Some(true));
    assert!(page.detail.is_none());
}

#[tokio::test]
async fn test_missing_model_fails_before_crawling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(cookie_page()))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(vec![server.uri()]);
    config.crawler.mode = GateMode::Both;
    config.classifier = Some(ClassifierConfig {
        model_path: "/nonexistent/model.json".to_string(),
    });

    assert!(run_crawl(&config, &hash()).await.is_err());
}

#[tokio::test]
async fn test_storage_records_run_and_incremental_crawl_skips_visited() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");

    mount_page(&server, "/", hub_page("Home", &["/cookies"])).await;
    mount_page(&server, "/cookies", cookie_page()).await;

    let mut config = create_test_config(vec![base.clone()]);
    config.output.database_path = Some(db_path.to_string_lossy().into_owned());
    config.output.incremental = true;

    let session = build_session(&config, &hash()).expect("session");
    let first_run = session.run_id().expect("storage enabled");
    let result = session.run().await.expect("first crawl failed");
    assert_eq!(result.pages.len(), 1);

    {
        let storage = SqliteStorage::new(&db_path).unwrap();
        let run = storage.get_run(first_run).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.mode, "search");

        let page = storage
            .get_page_by_url(&format!("{}/cookies", base))
            .unwrap()
            .expect("page recorded");
        assert_eq!(page.state, PageState::Accepted);
        assert_eq!(page.depth, 1);

        let matches = storage.get_top_matches(first_run, 10).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].title_match.is_some());
    }

    // Second run: the seed is re-fetched, the cookie page is not
    let session = build_session(&config, &hash()).expect("session");
    let second_run = session.run_id().unwrap();
    assert_ne!(first_run, second_run);
    let result = session.run().await.expect("second crawl failed");

    assert_eq!(result.statistics.pages_fetched, 1);
    assert!(result.pages.is_empty());

    let requests = server.received_requests().await.unwrap();
    let cookie_fetches = requests.iter().filter(|r| r.url.path() == "/cookies").count();
    assert_eq!(cookie_fetches, 1);
}

#[tokio::test]
async fn test_feature_rows_are_written() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let features_path = dir.path().join("features.csv");

    mount_page(&server, "/", hub_page("Home", &["/cookies"])).await;
    mount_page(&server, "/cookies", cookie_page()).await;

    let mut config = create_test_config(vec![base]);
    config.output.features_path = Some(features_path.to_string_lossy().into_owned());

    run_crawl(&config, &hash()).await.expect("crawl failed");

    let csv = std::fs::read_to_string(&features_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3, "header plus one row per page");
    assert!(lines[0].starts_with("url,"));
    assert!(lines[2].contains("/cookies"));
}

#[tokio::test]
async fn test_stop_handle_cancels_crawl() {
    let server = MockServer::start().await;
    mount_page(&server, "/", hub_page("Home", &["/a"])).await;

    let config = create_test_config(vec![server.uri()]);
    let session = build_session(&config, &hash()).expect("session");
    session
        .stop_handle()
        .store(true, std::sync::atomic::Ordering::Relaxed);

    let result = session.run().await.expect("cancelled crawl still returns");
    assert_eq!(result.statistics.pages_fetched, 0);
    assert!(result.pages.is_empty());
}
