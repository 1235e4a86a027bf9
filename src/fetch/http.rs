// src/fetch/http.rs
// =============================================================================
// Fetches pages over HTTP with reqwest.
//
// Key functionality:
// - One shared Client (connection pooling, cookies are not kept)
// - Finite timeout on every request, so an unresponsive server can never
//   stall the crawl
// - Optional HTTP basic auth for wikis behind a login
// - Non-2xx answers and non-HTML bodies become FetchError values instead of
//   empty pages, so the controller can log the reason
// =============================================================================

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{extract_page, Fetch, PageResult};
use crate::error::{CrawlError, FetchError};

/// Desktop browser user agent; some wikis serve a stripped page to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Transport settings for `HttpFetcher`.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub user_agent: String,
    /// (username, password) for HTTP basic auth
    pub credentials: Option<(String, String)>,
    /// Accept self-signed or otherwise invalid TLS certificates
    pub accept_invalid_certs: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials: None,
            accept_invalid_certs: false,
        }
    }
}

/// `Fetch` implementation backed by a reqwest client.
pub struct HttpFetcher {
    client: Client,
    credentials: Option<(String, String)>,
}

impl HttpFetcher {
    pub fn new(options: HttpOptions) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            credentials: options.credentials,
        })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<PageResult, FetchError> {
        let mut request = self.client.get(url);
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await.map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_html(&content_type) {
            return Err(FetchError::NotHtml(content_type));
        }

        // Links are resolved against the requested URL, not the redirect target
        let page_url = Url::parse(url).map_err(|e| FetchError::Body(e.to_string()))?;

        let body = response.text().await.map_err(FetchError::from_reqwest)?;
        debug!(url, bytes = body.len(), "fetched page");

        Ok(extract_page(&body, &page_url))
    }
}

// A missing content-type is given the benefit of the doubt
fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.starts_with("text/html")
        || content_type.starts_with("application/xhtml+xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html; charset=utf-8"));
        assert!(is_html("application/xhtml+xml"));
        assert!(is_html(""));
        assert!(!is_html("application/pdf"));
        assert!(!is_html("image/png"));
    }

    #[test]
    fn test_builds_client_with_defaults() {
        assert!(HttpFetcher::new(HttpOptions::default()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_runs_on_a_spawned_task() {
        let fetcher = HttpFetcher::new(HttpOptions {
            timeout: Duration::from_secs(1),
            ..HttpOptions::default()
        })
        .unwrap();
        // tokio::spawn only accepts Send futures
        let handle = tokio::spawn(async move { fetcher.fetch("http://127.0.0.1:9/").await });
        assert!(handle.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_fetch_error() {
        let fetcher = HttpFetcher::new(HttpOptions {
            timeout: Duration::from_secs(2),
            ..HttpOptions::default()
        })
        .unwrap();
        // Port 9 (discard) on localhost is closed on any sane test machine
        let result = fetcher.fetch("http://127.0.0.1:9/").await;
        assert!(result.is_err());
    }
}
