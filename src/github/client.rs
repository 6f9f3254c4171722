use crate::config::Config;
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const ACCEPT_COMMIT_SEARCH: &str = "application/vnd.github.cloak-preview+json";
const USER_AGENT: &str = concat!("gh-recap/", env!("CARGO_PKG_VERSION"));

/// Fixed buffer added on top of the advertised rate-limit reset time
const RATE_LIMIT_BUFFER_MS: i64 = 1000;

/// Search endpoints used by the activity queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEndpoint {
    /// `/search/issues`, used for pull request queries
    Issues,
    /// `/search/commits`, still a preview API needing its own media type
    Commits,
}

impl SearchEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            SearchEndpoint::Issues => "/search/issues",
            SearchEndpoint::Commits => "/search/commits",
        }
    }

    pub fn accept(&self) -> &'static str {
        match self {
            SearchEndpoint::Issues => ACCEPT_V3,
            SearchEndpoint::Commits => ACCEPT_COMMIT_SEARCH,
        }
    }
}

/// A GET request against the GitHub API, relative to the base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub accept: &'static str,
}

/// The parts of a response the client cares about
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// `X-RateLimit-Reset`, Unix epoch seconds
    pub rate_limit_reset: Option<i64>,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues authenticated requests. Swapped for a stub in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed transport sharing one read-only bearer token
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, token: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let response = self
            .client
            .get(&url)
            .query(&request.query)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, request.accept)
            .send()
            .await?;

        let status = response.status().as_u16();
        let rate_limit_reset = response
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<i64>().ok());
        let body = response.text().await?;

        Ok(ApiResponse {
            status,
            rate_limit_reset,
            body,
        })
    }
}

/// Bounds on the wait-out-the-window rate-limit policy. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryPolicy {
    pub max_retries: Option<u32>,
    pub max_wait: Option<Duration>,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_rate_limit_retries,
            max_wait: config.max_rate_limit_wait_secs.map(Duration::from_secs),
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct AuthenticatedUser {
    login: String,
}

/// Compute how long to sleep before retrying a rate-limited request
///
/// The reset value comes straight from a response header, so the arithmetic
/// saturates instead of overflowing on absurd values.
pub fn rate_limit_wait(reset_epoch_secs: i64, now: DateTime<Utc>) -> Duration {
    let wait_ms = reset_epoch_secs
        .saturating_mul(1000)
        .saturating_sub(now.timestamp_millis())
        .max(0)
        .saturating_add(RATE_LIMIT_BUFFER_MS);
    Duration::from_millis(wait_ms.unsigned_abs())
}

/// GitHub API client for the search endpoints
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
}

impl GitHubClient {
    /// Create a client over any transport
    pub fn new(transport: Arc<dyn Transport>, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    /// Create an HTTP client from config and a token
    pub fn from_config(config: &Config, token: String) -> Result<Self> {
        let transport = HttpTransport::new(
            &config.api_base_url,
            token,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self::new(Arc::new(transport), RetryPolicy::from_config(config)))
    }

    /// Resolve the login of the token owner via `GET /user`
    pub async fn resolve_username(&self) -> Result<String> {
        let request = ApiRequest {
            path: "/user".to_string(),
            query: Vec::new(),
            accept: ACCEPT_V3,
        };
        let body = self.send(&request).await?;
        let user: AuthenticatedUser = serde_json::from_str(&body)?;
        Ok(user.login)
    }

    /// Fetch one page of a search query (1-based page numbers)
    pub async fn fetch_page(
        &self,
        endpoint: SearchEndpoint,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage> {
        let request = ApiRequest {
            path: endpoint.path().to_string(),
            query: vec![
                ("q".to_string(), query.to_string()),
                ("per_page".to_string(), per_page.to_string()),
                ("page".to_string(), page.to_string()),
            ],
            accept: endpoint.accept(),
        };

        debug!(endpoint = endpoint.path(), page, query, "Fetching search page");
        let body = self.send(&request).await?;
        let parsed: SearchPage = serde_json::from_str(&body)?;
        Ok(parsed)
    }

    /// Send a request, waiting out rate-limit windows and retrying the identical request
    async fn send(&self, request: &ApiRequest) -> Result<String> {
        let mut attempts: u32 = 0;

        loop {
            let response = self.transport.get(request).await?;

            if response.status == 403 {
                if let Some(reset) = response.rate_limit_reset {
                    let wait = rate_limit_wait(reset, Utc::now());
                    self.check_retry_budget(attempts, wait)?;

                    warn!(
                        path = %request.path,
                        reset,
                        wait_ms = wait.as_millis() as u64,
                        attempt = attempts + 1,
                        "GitHub rate limit hit, waiting for reset"
                    );
                    tokio::time::sleep(wait).await;
                    attempts += 1;
                    continue;
                }
            }

            if !response.is_success() {
                return Err(RecapError::GitHubApi {
                    status: response.status,
                    body: response.body,
                });
            }

            return Ok(response.body);
        }
    }

    fn check_retry_budget(&self, attempts: u32, wait: Duration) -> Result<()> {
        let over_retries = self.retry.max_retries.is_some_and(|max| attempts >= max);
        let over_wait = self.retry.max_wait.is_some_and(|max| wait > max);

        if over_retries || over_wait {
            return Err(RecapError::RateLimitExceeded {
                attempts,
                wait_secs: wait.as_secs(),
            });
        }
        Ok(())
    }
}
