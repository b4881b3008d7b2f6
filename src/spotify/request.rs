use std::time::Duration;

use rand::Rng;
use reqwest::{Client, RequestBuilder, Response, StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;
use tokio::time::{Instant, sleep};

use crate::{
    config::{DEFAULT_API_URL, DEFAULT_TOKEN_URL},
    error::{Error, Result},
    types::AccessToken,
};

/// Base URLs of the accounts service and the Web API.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub api_url: String,
    pub token_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

/// Timeout and retry behaviour applied to every outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    /// Longest `Retry-After` the client is willing to sleep through.
    pub max_retry_after: Duration,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 3,
            base_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            max_retry_after: Duration::from_secs(120),
        }
    }
}

impl RequestPolicy {
    /// Exponential backoff for the given zero-based retry, capped at
    /// `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.min(16));
        self.base_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    fn jitter(&self) -> Duration {
        let max_ms = (self.base_backoff.as_millis() / 2) as u64;
        Duration::from_millis(rand::rng().random_range(0..=max_ms))
    }
}

/// Everything an authenticated catalog request needs.
///
/// The context is never mutated by the operations that borrow it; a new
/// deadline or token means a new context.
#[derive(Debug, Clone)]
pub struct RequestContext {
    http: Client,
    endpoints: Endpoints,
    token: AccessToken,
    policy: RequestPolicy,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(http: Client, endpoints: Endpoints, token: AccessToken, policy: RequestPolicy) -> Self {
        Self {
            http,
            endpoints,
            token,
            policy,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{base}/{path}",
            base = self.endpoints.api_url.trim_end_matches('/'),
            path = path.trim_start_matches('/')
        )
    }

    /// Issues a bearer-authenticated GET against the Web API.
    pub(crate) async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = self.api_url(path);
        execute(&self.policy, self.deadline, &url, || {
            self.http
                .get(&url)
                .bearer_auth(&self.token.access_token)
                .query(query)
        })
        .await
    }
}

pub fn build_http_client(policy: &RequestPolicy) -> Result<Client> {
    Client::builder()
        .connect_timeout(policy.timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Network {
            attempts: 0,
            reason: e.to_string(),
        })
}

fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn request_timeout(policy: &RequestPolicy, deadline: Option<Instant>, endpoint: &str) -> Result<Duration> {
    match deadline {
        None => Ok(policy.timeout),
        Some(deadline) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::DeadlineExceeded(endpoint.to_string()));
            }
            Ok(policy.timeout.min(remaining))
        }
    }
}

async fn wait(delay: Duration, deadline: Option<Instant>, endpoint: &str) -> Result<()> {
    if let Some(deadline) = deadline {
        if Instant::now() + delay >= deadline {
            return Err(Error::DeadlineExceeded(endpoint.to_string()));
        }
    }
    sleep(delay).await;
    Ok(())
}

/// Sends the request built by `build`, retrying transient failures.
///
/// Timeouts, connection failures, 429 and 5xx gateway errors are retried with
/// exponential backoff up to `policy.max_retries` times. Every other response
/// is handed back to the caller untouched, whatever its status.
pub(crate) async fn execute<F>(
    policy: &RequestPolicy,
    deadline: Option<Instant>,
    endpoint: &str,
    build: F,
) -> Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let timeout = request_timeout(policy, deadline, endpoint)?;

        let (reason, delay) = match build().timeout(timeout).send().await {
            Ok(response) => {
                let status = response.status();
                if !is_transient(status) {
                    return Ok(response);
                }

                let reason = format!("{} answered {}", endpoint, status);
                match retry_after(&response) {
                    Some(after) if after > policy.max_retry_after => {
                        return Err(Error::Network {
                            attempts,
                            reason: format!(
                                "{} asked to retry after {} seconds",
                                endpoint,
                                after.as_secs()
                            ),
                        });
                    }
                    Some(after) => (reason, after),
                    None => (reason, policy.backoff(attempts - 1)),
                }
            }
            Err(err) if err.is_timeout() || err.is_connect() => {
                (err.to_string(), policy.backoff(attempts - 1))
            }
            Err(err) => {
                return Err(Error::Network {
                    attempts,
                    reason: err.to_string(),
                });
            }
        };

        if attempts > policy.max_retries {
            return Err(Error::Network { attempts, reason });
        }

        wait(delay + policy.jitter(), deadline, endpoint).await?;
    }
}

pub(crate) fn excerpt(body: &str) -> String {
    const MAX: usize = 200;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Turns a non-success response into the matching error.
///
/// A 401 means the bearer token was rejected and is reported as an
/// authentication failure; anything else is an API error.
pub(crate) async fn ensure_success(response: Response, endpoint: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = excerpt(&response.text().await.unwrap_or_default());
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication(format!(
            "{} rejected the access token: {}",
            endpoint, body
        )));
    }

    Err(Error::Api {
        status: status.as_u16(),
        endpoint: endpoint.to_string(),
        body,
    })
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T> {
    let body = response.text().await.map_err(|e| Error::Network {
        attempts: 1,
        reason: e.to_string(),
    })?;

    serde_json::from_str(&body).map_err(|e| Error::MalformedResponse {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}
