//! HTTP client with connection pooling and retry logic

use episode_config::NetworkConfig;
use episode_errors::{Error, NetworkError};
use reqwest::header::{HeaderValue, RANGE};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Longest wait for response headers; the body is bounded by `chunk_timeout`
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Longest silence tolerated between two body chunks
    pub chunk_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(30),
            chunk_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            retry_count: 3,
            retry_delay: Duration::from_secs(1),
            user_agent: default_user_agent(),
        }
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            timeout: config.timeout(),
            connect_timeout: config.connect_timeout(),
            chunk_timeout: config.chunk_timeout(),
            retry_count: config.retries,
            retry_delay: config.retry_delay(),
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(default_user_agent),
            ..Self::default()
        }
    }
}

fn default_user_agent() -> String {
    format!("episode/{}", env!("CARGO_PKG_VERSION"))
}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Execute a GET request with retries
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retry attempts.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        self.retry_request(url, || self.client.get(url).send()).await
    }

    /// Execute a GET request for the bytes from `offset` to the end
    ///
    /// An offset of zero sends a plain GET.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retry attempts.
    pub async fn get_from_offset(&self, url: &str, offset: u64) -> Result<Response, Error> {
        if offset == 0 {
            return self.get(url).await;
        }

        let range = HeaderValue::from_str(&format!("bytes={offset}-"))
            .map_err(|e| Error::internal(format!("invalid range header: {e}")))?;
        self.retry_request(url, || {
            self.client
                .get(url)
                .header(RANGE, range.clone())
                .send()
        })
        .await
    }

    /// Execute a request with retries
    ///
    /// Transport errors worth retrying and 5xx responses are retried with a
    /// linearly growing delay. The last 5xx response is returned as-is once
    /// attempts run out so the caller can report the status.
    async fn retry_request<F, Fut>(&self, url: &str, mut f: F) -> Result<Response, Error>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Response, reqwest::Error>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.retry_count {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay * attempt).await;
            }

            match tokio::time::timeout(self.config.timeout, f()).await {
                Ok(Ok(response)) => {
                    // Check for rate limiting
                    if response.status() == StatusCode::TOO_MANY_REQUESTS {
                        if let Some(retry_after) = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                        {
                            return Err(NetworkError::RateLimited {
                                seconds: retry_after,
                            }
                            .into());
                        }
                    }

                    if response.status().is_server_error() && attempt < self.config.retry_count {
                        tracing::debug!(
                            url,
                            status = response.status().as_u16(),
                            attempt,
                            "server error, retrying"
                        );
                        continue;
                    }

                    return Ok(response);
                }
                Ok(Err(e)) => {
                    let retry = Self::should_retry(&e);
                    tracing::debug!(url, attempt, error = %e, retry, "request failed");
                    last_error = Some(Self::classify(url, &e));

                    // Don't retry on certain errors
                    if !retry {
                        break;
                    }
                }
                Err(_) => {
                    tracing::debug!(url, attempt, "no response before timeout");
                    last_error = Some(NetworkError::Timeout {
                        url: url.to_string(),
                    });
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| NetworkError::DownloadFailed("Unknown error".to_string()))
            .into())
    }

    fn classify(url: &str, error: &reqwest::Error) -> NetworkError {
        if error.is_timeout() {
            NetworkError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            NetworkError::ConnectionRefused(error.to_string())
        } else {
            NetworkError::DownloadFailed(error.to_string())
        }
    }

    /// Determine if an error should be retried
    fn should_retry(error: &reqwest::Error) -> bool {
        // Retry on timeout, connection errors, and server errors
        error.is_timeout()
            || error.is_connect()
            || error.status().is_none_or(|s| s.is_server_error())
    }
}
