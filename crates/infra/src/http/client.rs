use std::time::Duration;

use evosync_domain::{EvosyncError, EvosusConfig};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// HTTP client with built-in retry and timeout support.
///
/// Transport failures and 5xx responses are retried with exponential
/// backoff; 4xx responses are returned to the caller on the first attempt.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, EvosyncError> {
        Self::builder().build()
    }

    /// Client tuned from the Evosus connection settings.
    pub fn for_evosus(config: &EvosusConfig) -> Result<Self, EvosyncError> {
        Self::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .max_attempts(config.max_retries as usize + 1)
            .base_backoff(Duration::from_millis(config.base_backoff_ms))
            .user_agent(config.user_agent.clone())
            .build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Total attempts per request (initial try + retries).
    pub const fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Execute the provided request builder with retry semantics.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, EvosyncError> {
        let attempts = self.max_attempts.max(1);

        for attempt in 1..=attempts {
            let last = attempt == attempts;
            match self.attempt(&builder, attempt).await? {
                Attempt::Response(response) => {
                    if response.status().is_server_error() && !last {
                        self.wait_before_retry(attempt).await;
                        continue;
                    }
                    return Ok(response);
                }
                Attempt::Transport { error, retryable } => {
                    if retryable && !last {
                        self.wait_before_retry(attempt).await;
                        continue;
                    }
                    return Err(error);
                }
            }
        }

        Err(EvosyncError::Internal("http client exhausted retries without producing a result".into()))
    }

    /// One try of `builder`, without retries. `attempt` is 1-based and only
    /// used for logging.
    ///
    /// # Errors
    /// Requests that cannot be cloned or built; transport failures are
    /// returned as [`Attempt::Transport`].
    pub async fn attempt(&self, builder: &RequestBuilder, attempt: usize) -> Result<Attempt, EvosyncError> {
        let cloned_builder = builder.try_clone().ok_or_else(|| {
            EvosyncError::Internal("request body cannot be cloned; buffer the body to enable retries".into())
        })?;

        let request = cloned_builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            EvosyncError::from(infra)
        })?;

        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(attempt, %method, endpoint = %path, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(attempt, %method, endpoint = %path, %status, "received HTTP response");
                if status.is_server_error() {
                    warn!(attempt, endpoint = %path, %status, "server error");
                }
                Ok(Attempt::Response(response))
            }
            Err(err) => {
                let err = err.without_url();
                let retryable = should_retry_error(&err);
                warn!(attempt, %method, endpoint = %path, error = %err, retryable, "transport failure");
                let infra: InfraError = err.into();
                Ok(Attempt::Transport { error: EvosyncError::from(infra), retryable })
            }
        }
    }

    /// Sleep the backoff that follows failed attempt number `attempt`.
    pub async fn wait_before_retry(&self, attempt: usize) {
        self.sleep_with_backoff(attempt).await;
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Result of a single [`HttpClient::attempt`].
#[derive(Debug)]
pub enum Attempt {
    /// Any HTTP response, including error statuses.
    Response(Response),
    /// No response; `retryable` for timeouts and connection failures.
    Transport { error: EvosyncError, retryable: bool },
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 4,
            base_backoff: Duration::from_secs(1),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, EvosyncError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            EvosyncError::from(infra)
        })?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_request() || err.is_connect()
}
