//! HTTP client for the DataForSEO-compatible keyword API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use seedscope_shared::{Credentials, DiscoveryOptions, ProviderConfig, Result, SeedScopeError};

use crate::retry::RetryPolicy;
use crate::wire::{Envelope, STATUS_NO_RESULTS, STATUS_OK};

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("SeedScope/", env!("CARGO_PKG_VERSION"));

/// Connect timeout, independent of the overall request timeout.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Language and location every provider task is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    pub language_name: String,
    pub location_code: u32,
}

impl From<&DiscoveryOptions> for Market {
    fn from(opts: &DiscoveryOptions) -> Self {
        Self {
            language_name: opts.language_name.clone(),
            location_code: opts.location_code,
        }
    }
}

impl Default for Market {
    fn default() -> Self {
        Self::from(&DiscoveryOptions::default())
    }
}

/// One failed attempt, tagged with whether another attempt may help.
struct Failure {
    error: SeedScopeError,
    retryable: bool,
}

impl Failure {
    fn fatal(error: SeedScopeError) -> Self {
        Self {
            error,
            retryable: false,
        }
    }

    fn transient(error: SeedScopeError) -> Self {
        Self {
            error,
            retryable: true,
        }
    }
}

/// Authenticated client for the keyword provider.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ProviderClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ProviderClient {
    /// Build a client from the `[provider]` config section.
    pub fn new(config: &ProviderConfig, credentials: Credentials) -> Result<Self> {
        let base_url = Url::parse(&config.api_url).map_err(|e| {
            SeedScopeError::config(format!("invalid api_url '{}': {e}", config.api_url))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SeedScopeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            credentials,
            retry: RetryPolicy::from(config),
        })
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// POST a single task and return the items of its first result.
    ///
    /// Transport errors, HTTP 429/5xx and envelope codes in the 5xxxx range
    /// are retried according to the policy; everything else fails at once.
    pub(crate) async fn post_task<T: Serialize>(&self, path: &str, task: &T) -> Result<Vec<Value>> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| SeedScopeError::config(format!("invalid endpoint path {path}: {e}")))?;
        let body = [task];

        let mut attempt = 0;
        loop {
            match self.send_once(&url, &body).await {
                Ok(items) => return Ok(items),
                Err(failure) if failure.retryable && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        %url,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure.error,
                        "provider call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }

    async fn send_once<T: Serialize>(
        &self,
        url: &Url,
        body: &[&T],
    ) -> std::result::Result<Vec<Value>, Failure> {
        debug!(%url, "posting provider task");

        let response = self
            .client
            .post(url.as_str())
            .basic_auth(&self.credentials.login, Some(&self.credentials.password))
            .json(body)
            .send()
            .await
            .map_err(|e| Failure::transient(SeedScopeError::Network(format!("{url}: {e}"))))?;

        let status = response.status();
        if !status.is_success() {
            let error = SeedScopeError::Network(format!("{url}: HTTP {status}"));
            return Err(if is_retryable_status(status) {
                Failure::transient(error)
            } else {
                Failure::fatal(error)
            });
        }

        let text = response.text().await.map_err(|e| {
            Failure::transient(SeedScopeError::Network(format!(
                "{url}: failed to read body: {e}"
            )))
        })?;

        let envelope: Envelope = serde_json::from_str(&text).map_err(|e| {
            Failure::fatal(SeedScopeError::parse(format!(
                "{url}: invalid response: {e} (got: {})",
                text.chars().take(200).collect::<String>()
            )))
        })?;

        extract_items(envelope)
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_code(code: u32) -> bool {
    (50000..60000).contains(&code)
}

/// Unwrap the envelope down to the first task's first result items.
fn extract_items(envelope: Envelope) -> std::result::Result<Vec<Value>, Failure> {
    let check = |code: u32, message: String| {
        if code == STATUS_OK {
            Ok(())
        } else if is_retryable_code(code) {
            Err(Failure::transient(SeedScopeError::provider(code, message)))
        } else {
            Err(Failure::fatal(SeedScopeError::provider(code, message)))
        }
    };

    check(envelope.status_code, envelope.status_message)?;

    let task = envelope
        .tasks
        .and_then(|tasks| tasks.into_iter().next())
        .ok_or_else(|| Failure::fatal(SeedScopeError::parse("response contains no tasks")))?;

    if task.status_code == STATUS_NO_RESULTS {
        debug!("provider has no results for this task");
        return Ok(Vec::new());
    }
    check(task.status_code, task.status_message)?;

    Ok(task
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|result| result.items)
        .unwrap_or_default())
}
