//! Client for the published schedule feed.
//!
//! The festival publishes its schedule as one flat JSON table per
//! category. This client fetches and decodes a category's rows; it never
//! retries, and a failed fetch leaves the local snapshot untouched.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::models::{Category, RemoteEvent};

use super::SourceError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for the published schedule feed.
pub const DEFAULT_BASE_URL: &str = "https://sunspirit-app.s3.amazonaws.com/schedule";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the remote schedule feed.
/// Clone is cheap; reqwest::Client pools connections internally.
#[derive(Clone)]
pub struct SourceClient {
    client: Client,
    base_url: String,
}

impl SourceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch the latest rows for one category.
    pub async fn fetch_category_records(
        &self,
        category: Category,
    ) -> Result<Vec<RemoteEvent>, SourceError> {
        let url = format!(
            "{}/{}.json",
            self.base_url.trim_end_matches('/'),
            category.store_name()
        );
        debug!(url = %url, "fetching category rows");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let records: Vec<RemoteEvent> = response.json().await?;
        debug!(
            category = category.store_name(),
            rows = records.len(),
            "fetched category rows"
        );
        Ok(records)
    }
}
