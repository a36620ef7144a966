pub mod dto;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::warn;

use crate::error::{FetchError, SyncError};

use self::dto::PageEnvelope;

/// One classified page request. Implementations issue exactly one GET per
/// call and keep no local state; retry lives in [`PageFetcher`].
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PageEnvelope, FetchError>;
}

#[derive(Clone, Debug)]
pub struct ApiCredentials {
    pub client_key: String,
    pub client_secret: String,
}

pub struct HttpPageSource {
    client: Client,
    credentials: ApiCredentials,
}

impl HttpPageSource {
    pub fn new(credentials: ApiCredentials) -> Result<Self, SyncError> {
        let client = Client::builder()
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            credentials,
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<PageEnvelope, FetchError> {
        let response = self
            .client
            .get(url)
            .basic_auth(
                &self.credentials.client_key,
                Some(&self.credentials.client_secret),
            )
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        classify(status, &body)
    }
}

/// Maps one HTTP outcome onto the error taxonomy: 2xx with a decodable
/// envelope succeeds; 429/503/524 and decode failures are transient;
/// everything else is rejected outright.
pub fn classify(status: StatusCode, body: &str) -> Result<PageEnvelope, FetchError> {
    match status.as_u16() {
        200..=299 => serde_json::from_str::<PageEnvelope>(body)
            .map_err(|e| FetchError::Malformed(e.to_string())),
        s @ (429 | 503 | 524) => Err(FetchError::Throttled(s)),
        s => Err(FetchError::Rejected(s)),
    }
}

/// Bounded retry for transient fetch failures. The default waits out a full
/// 30-minute throttle window before re-requesting, five attempts at most.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1800),
        }
    }
}

/// Fetches one page with bounded retries on transient failures. The same URL
/// is re-requested after a fixed delay; exceeding the bound escalates to a
/// fatal [`SyncError::RetriesExhausted`].
pub struct PageFetcher<S> {
    source: S,
    retry: RetryPolicy,
}

impl<S: PageSource> PageFetcher<S> {
    pub fn new(source: S, retry: RetryPolicy) -> Self {
        Self { source, retry }
    }

    pub async fn fetch_page(&self, url: &str) -> Result<PageEnvelope, SyncError> {
        let mut attempt = 1;
        loop {
            match self.source.fetch(url).await {
                Ok(page) => return Ok(page),
                Err(e @ (FetchError::Throttled(_) | FetchError::Malformed(_))) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(SyncError::RetriesExhausted {
                            attempts: attempt,
                            last: e,
                        });
                    }
                    warn!(
                        attempt,
                        max = self.retry.max_attempts,
                        delay_secs = self.retry.delay.as_secs(),
                        "transient fetch failure, will retry: {}",
                        e
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(FetchError::Rejected(status)) => {
                    return Err(SyncError::PermanentClient { status });
                }
                Err(FetchError::Transport(e)) => return Err(SyncError::Transport(e)),
            }
        }
    }
}
