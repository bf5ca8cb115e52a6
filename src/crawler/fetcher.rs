//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests to fetch page content
//! - Error classification into page states

use crate::config::UserAgentConfig;
use crate::state::PageState;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Maximum number of redirects followed for a single fetch
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// The page state this error maps to
        state: PageState,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// The page state this error maps to
        state: PageState,
    },
}

impl FetchOutcome {
    /// The page state recorded for an unsuccessful fetch
    pub fn failure_state(&self) -> Option<PageState> {
        match self {
            Self::Success { .. } => None,
            Self::ContentMismatch { .. } => Some(PageState::ContentMismatch),
            Self::HttpError { state, .. } | Self::NetworkError { state, .. } => Some(*state),
        }
    }

    /// Human readable reason for an unsuccessful fetch
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::ContentMismatch { content_type } => {
                Some(format!("not an HTML page ({})", content_type))
            }
            Self::HttpError { status_code, .. } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error, .. } => Some(error.clone()),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// The User-Agent is formatted as `CrawlerName/Version (+ContactURL)`.
///
/// # Example
///
/// ```no_run
/// use recipe_ripple::config::UserAgentConfig;
/// use recipe_ripple::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "Recipe-Collector-Bot".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/bot".to_string(),
///     timeout_secs: 10,
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.timeout_secs);

    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true for content types the document parser understands
///
/// A missing header is given the benefit of the doubt.
fn is_html_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml+xml")
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | HTTP 200 + HTML | Success |
/// | HTTP 200 + other content type | ContentMismatch |
/// | HTTP 404 / 410 | HttpError → DeadLink |
/// | HTTP 429 | HttpError → RateLimited |
/// | Any other status | HttpError → Failed |
/// | Timeout / connection failure | NetworkError → Unreachable |
/// | Redirect limit or body error | NetworkError → Failed |
pub async fn fetch_url(client: &Client, url: &Url) -> FetchOutcome {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return classify_transport_error(e),
    };

    let status = response.status();
    let final_url = response.url().clone();

    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        return FetchOutcome::HttpError {
            status_code: status.as_u16(),
            state: PageState::DeadLink,
        };
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return FetchOutcome::HttpError {
            status_code: status.as_u16(),
            state: PageState::RateLimited,
        };
    }

    // Only a plain 200 carries a full page; 203, 206 and the like do not
    if status != StatusCode::OK {
        return FetchOutcome::HttpError {
            status_code: status.as_u16(),
            state: PageState::Failed,
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html_content_type(&content_type) {
        return FetchOutcome::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchOutcome::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => FetchOutcome::NetworkError {
            error: e.to_string(),
            state: PageState::Failed,
        },
    }
}

fn classify_transport_error(e: reqwest::Error) -> FetchOutcome {
    if e.is_timeout() {
        FetchOutcome::NetworkError {
            error: "Request timeout".to_string(),
            state: PageState::Unreachable,
        }
    } else if e.is_connect() {
        FetchOutcome::NetworkError {
            error: format!("Connection failed: {}", e),
            state: PageState::Unreachable,
        }
    } else if e.is_redirect() {
        FetchOutcome::NetworkError {
            error: "Too many redirects".to_string(),
            state: PageState::Failed,
        }
    } else {
        FetchOutcome::NetworkError {
            error: e.to_string(),
            state: PageState::Failed,
        }
    }
}

/// HTTP client bound to one crawler identity
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher from the user agent configuration
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Fetches one page
    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        tracing::debug!("GET {}", url);
        fetch_url(&self.client, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            timeout_secs: 5,
        }
    }

    fn page_url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&create_test_config()).is_ok());
    }

    #[test]
    fn test_html_content_types() {
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("TEXT/HTML"));
        assert!(is_html_content_type("application/xhtml+xml"));
        assert!(is_html_content_type(""));
        assert!(!is_html_content_type("application/pdf"));
        assert!(!is_html_content_type("image/png"));
    }

    #[tokio::test]
    async fn test_fetch_success_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pie"))
            .and(header(
                "user-agent",
                "TestCrawler/1.0 (+https://example.com/about)",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<h1>Pie</h1>", "text/html"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&create_test_config()).unwrap();
        let outcome = fetcher.fetch(&page_url(&server, "/pie")).await;

        match outcome {
            FetchOutcome::Success {
                status_code, body, ..
            } => {
                assert_eq!(status_code, 200);
                assert_eq!(body, "<h1>Pie</h1>");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_classifies_http_errors() {
        let server = MockServer::start().await;
        Mock::given(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/busy"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&create_test_config()).unwrap();

        let missing = fetcher.fetch(&page_url(&server, "/missing")).await;
        assert_eq!(missing.failure_state(), Some(PageState::DeadLink));

        let busy = fetcher.fetch(&page_url(&server, "/busy")).await;
        assert_eq!(busy.failure_state(), Some(PageState::RateLimited));

        let broken = fetcher.fetch(&page_url(&server, "/broken")).await;
        assert_eq!(broken.failure_state(), Some(PageState::Failed));
        assert_eq!(broken.failure_message().as_deref(), Some("HTTP 500"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_200_success_codes() {
        let server = MockServer::start().await;
        Mock::given(path("/proxied"))
            .respond_with(ResponseTemplate::new(203).set_body_raw("<h1>Pie</h1>", "text/html"))
            .mount(&server)
            .await;
        Mock::given(path("/partial"))
            .respond_with(ResponseTemplate::new(206).set_body_raw("<h1>Pi", "text/html"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&create_test_config()).unwrap();

        let proxied = fetcher.fetch(&page_url(&server, "/proxied")).await;
        assert!(matches!(
            proxied,
            FetchOutcome::HttpError {
                status_code: 203,
                state: PageState::Failed
            }
        ));

        let partial = fetcher.fetch(&page_url(&server, "/partial")).await;
        assert_eq!(partial.failure_state(), Some(PageState::Failed));
        assert_eq!(partial.failure_message().as_deref(), Some("HTTP 206"));
    }

    #[tokio::test]
    async fn test_fetch_content_mismatch() {
        let server = MockServer::start().await;
        Mock::given(path("/card.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF", "application/pdf"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&create_test_config()).unwrap();
        let outcome = fetcher.fetch(&page_url(&server, "/card.pdf")).await;
        assert!(matches!(outcome, FetchOutcome::ContentMismatch { .. }));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        // Bind then drop a server so the port is very likely closed
        let server = MockServer::start().await;
        let url = page_url(&server, "/gone");
        drop(server);

        let fetcher = Fetcher::new(&create_test_config()).unwrap();
        let outcome = fetcher.fetch(&url).await;
        assert!(matches!(outcome, FetchOutcome::NetworkError { .. }));
    }
}
