//! HTTP session with retry for thread pages and asset downloads.
//!
//! A single [`HttpSession`] is built per archive run and every request goes
//! through its pooled client. Page fetches retry transient failures with
//! exponential backoff; asset downloads are single attempts because a missing
//! image only costs that one image.

use std::time::Duration;

use reqwest::header::{HeaderMap, REFERER, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use url::Url;

use crate::parse::Document;
use crate::{Result, ThreadkeepError};

/// Statuses on which urllib3-style retry policies try again.
pub const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// HTTP client configuration for fetching pages and assets.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Retries after the first attempt for page fetches.
    pub retries: u32,
    /// Base delay; retry `n` waits `backoff_factor * 2^(n-1)`.
    pub backoff_factor: Duration,
    /// Upper bound for a single backoff or `Retry-After` wait.
    pub backoff_max: Duration,
    /// Status codes that trigger a retry.
    pub retry_statuses: Vec<u16>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; Threadkeep/0.1)".to_string(),
            retries: 3,
            backoff_factor: Duration::from_secs(1),
            backoff_max: Duration::from_secs(120),
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
        }
    }
}

impl FetchConfig {
    /// Delay before retry number `retry` (1-based).
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.backoff_factor.saturating_mul(1u32 << exponent).min(self.backoff_max)
    }

    fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }
}

/// Parses a URL and checks that it can be fetched over HTTP.
pub fn parse_http_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| ThreadkeepError::InvalidUrl(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ThreadkeepError::InvalidUrl(format!(
            "{}: unsupported scheme '{}', expected http or https",
            url, other
        ))),
    }
}

/// Reusable HTTP session.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
    config: FetchConfig,
}

impl HttpSession {
    /// Builds the pooled client for `config`.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ThreadkeepError::HttpError)?;

        Ok(Self { client, config })
    }

    /// Fetches a thread page and parses it.
    ///
    /// Never fails: network errors and non-success statuses (after retries)
    /// are logged and yield [`Document::empty`], so metadata readers fall back
    /// to their defaults and the page loop keeps going.
    pub async fn fetch_page(&self, url: &str) -> Document {
        match self.fetch_text(url).await {
            Ok(html) => Document::parse(&html).unwrap_or_else(|e| {
                tracing::warn!(url, error = %e, "failed to parse page");
                Document::empty()
            }),
            Err(e) => {
                tracing::warn!(url, error = %e, "failed to fetch page");
                Document::empty()
            }
        }
    }

    /// Fetches a page body as text, retrying transient failures.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let url = parse_http_url(url)?;
        let response = self.get_with_retry(&url).await?;
        let response = ensure_success(&url, response)?;

        Ok(response.text().await?)
    }

    /// GET with the configured retry policy.
    ///
    /// Returns the last response even when its status is an error; callers
    /// decide what a non-success status means for them.
    pub async fn get_with_retry(&self, url: &Url) -> Result<Response> {
        let mut retry = 0;

        loop {
            let outcome = self.send(url, &HeaderMap::new()).await;
            let can_retry = retry < self.config.retries;

            let delay = match outcome {
                Ok(response) if can_retry && self.config.should_retry_status(response.status()) => {
                    let delay = retry_after(&response)
                        .map(|d| d.min(self.config.backoff_max))
                        .unwrap_or_else(|| self.config.backoff_delay(retry + 1));
                    tracing::debug!(%url, status = response.status().as_u16(), ?delay, "retrying after status");
                    delay
                }
                Err(e) if can_retry && is_transient(&e) => {
                    let delay = self.config.backoff_delay(retry + 1);
                    tracing::debug!(%url, error = %e, ?delay, "retrying after error");
                    delay
                }
                other => return other,
            };

            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }

    /// Downloads an asset body in a single attempt.
    ///
    /// `referer` is sent as the `Referer` header; image hosts with hotlink
    /// protection refuse requests without one.
    pub async fn download(&self, url: &Url, referer: Option<&str>) -> Result<Vec<u8>> {
        let mut headers = HeaderMap::new();
        if let Some(referer) = referer
            && let Ok(value) = referer.parse()
        {
            headers.insert(REFERER, value);
        }

        let response = self.send(url, &headers).await?;
        let response = ensure_success(url, response)?;
        let bytes = response.bytes().await?;

        Ok(bytes.to_vec())
    }

    async fn send(&self, url: &Url, headers: &HeaderMap) -> Result<Response> {
        self.client
            .get(url.clone())
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ThreadkeepError::Timeout { timeout: self.config.timeout }
                } else {
                    ThreadkeepError::HttpError(e)
                }
            })
    }
}

fn ensure_success(url: &Url, response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ThreadkeepError::HttpStatus { url: url.to_string(), status: response.status().as_u16() })
    }
}

fn is_transient(err: &ThreadkeepError) -> bool {
    match err {
        ThreadkeepError::Timeout { .. } => true,
        ThreadkeepError::HttpError(e) => e.is_connect() || e.is_request() || e.is_timeout(),
        _ => false,
    }
}

/// `Retry-After` in seconds, honoured on 429 and 503 only.
fn retry_after(response: &Response) -> Option<Duration> {
    if !matches!(response.status(), StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE) {
        return None;
    }

    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 30);
        assert_eq!(config.retries, 3);
        assert_eq!(config.retry_statuses, vec![429, 500, 502, 503, 504]);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_backoff_doubles() {
        let config = FetchConfig::default();
        assert_eq!(config.backoff_delay(1), Duration::from_secs(1));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(config.backoff_delay(3), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = FetchConfig { backoff_max: Duration::from_secs(5), ..Default::default() };
        assert_eq!(config.backoff_delay(10), Duration::from_secs(5));
        assert_eq!(config.backoff_delay(u32::MAX), Duration::from_secs(5));
    }

    #[test]
    fn test_retry_statuses() {
        let config = FetchConfig::default();
        assert!(config.should_retry_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(config.should_retry_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!config.should_retry_status(StatusCode::NOT_FOUND));
        assert!(!config.should_retry_status(StatusCode::OK));
    }

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("https://www.example.com/foro/hilo-1").is_ok());
        assert!(parse_http_url("  http://example.com  ").is_ok());
        assert!(matches!(parse_http_url("example.com"), Err(ThreadkeepError::InvalidUrl(_))));
        assert!(matches!(
            parse_http_url("ftp://example.com/file"),
            Err(ThreadkeepError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_fetch_page_invalid_url_is_empty() {
        let session = HttpSession::new(FetchConfig::default()).unwrap();
        let doc = std::thread::spawn(move || {
            tokio::runtime::Runtime::new()
                .unwrap()
                .block_on(async move { session.fetch_page("not-a-url").await.as_string() })
        })
        .join()
        .unwrap();

        let doc = Document::parse(&doc).unwrap();
        assert!(doc.select("body *").unwrap().is_empty());
    }
}
