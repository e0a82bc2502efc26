//! HTTP client wrapper with retry logic.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, warn};

use crate::error::{OsmError, Result};

/// First backoff delay; doubled on every further attempt.
const BASE_BACKOFF: Duration = Duration::from_millis(500);

/// HTTP client returning response bodies as text. Clones share one
/// connection pool.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

/// Whether a status is worth another attempt: rate limiting and server errors.
fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

impl HttpClient {
    /// Create a new HTTP client. OSM services require an identifying user agent.
    pub fn new(user_agent: &str, request_timeout: Duration, max_retries: u32) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            max_retries,
        })
    }

    /// GET `url` with query parameters.
    pub async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        self.execute_with_retry(url, || self.client.get(url).query(query))
            .await
    }

    /// POST an urlencoded form to `url`.
    pub async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String> {
        self.execute_with_retry(url, || self.client.post(url).form(form))
            .await
    }

    /// Execute a request with exponential backoff retry.
    ///
    /// Timeouts, connection failures, 429 and 5xx are retried; other 4xx
    /// responses fail at once.
    async fn execute_with_retry(
        &self,
        url: &str,
        request: impl Fn() -> RequestBuilder,
    ) -> Result<String> {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = BASE_BACKOFF * 2u32.pow(attempt - 1);
                debug!("retrying {} in {:?} (attempt {})", url, delay, attempt + 1);
                tokio::time::sleep(delay).await;
            }

            match request().send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp.text().await?),
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    let err = OsmError::Network(format!(
                        "HTTP {} from {}: {}",
                        status,
                        url,
                        body.chars().take(300).collect::<String>()
                    ));
                    if !is_retryable(status) {
                        return Err(err);
                    }
                    warn!("{}", err);
                    last_err = Some(err);
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    warn!("request to {} failed: {}", url, e);
                    last_err = Some(OsmError::Http(e));
                }
                Err(e) => return Err(OsmError::Http(e)),
            }
        }

        Err(last_err.unwrap_or_else(|| OsmError::Network(format!("request to {url} failed"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::GATEWAY_TIMEOUT));
        assert!(is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_client_builds() {
        let client = HttpClient::new("vistamap-test/0.1", Duration::from_secs(5), 2).unwrap();
        assert_eq!(client.max_retries, 2);
    }
}
