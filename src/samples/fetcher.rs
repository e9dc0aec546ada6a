use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

/// HTTP request timeout in seconds.
/// Samples are a few megabytes; 60s covers slow festival-site connections.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Errors from fetching a sample payload or probing its size.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {0} from {1}")]
    Status(reqwest::StatusCode, String),
}

/// Fetch primitive for binary sample payloads.
///
/// Split into a metadata probe and a full fetch so callers can price a
/// batch before downloading it.
#[async_trait]
pub trait SampleFetcher: Send + Sync {
    /// Fetch the full payload at `url`.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Probe `url` for its payload size without downloading it. `Ok(None)`
    /// when the server does not report a length.
    async fn content_length(&self, url: &str) -> Result<Option<u64>, FetchError>;
}

/// [`SampleFetcher`] backed by a shared [`reqwest::Client`].
/// Clone is cheap; the underlying client pools connections.
#[derive(Clone)]
pub struct HttpSampleFetcher {
    client: Client,
}

impl HttpSampleFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SampleFetcher for HttpSampleFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status(), url.to_string()));
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn content_length(&self, url: &str) -> Result<Option<u64>, FetchError> {
        let response = self.client.head(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status(), url.to_string()));
        }
        Ok(response.content_length())
    }
}
