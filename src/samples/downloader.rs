use futures::future;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

use crate::models::{Category, EventRecord};
use crate::store::{EventStore, StoreError};

use super::fetcher::SampleFetcher;

/// Downloads missing audio samples for a category and attaches them to
/// their records in the store.
///
/// Sample payloads are large relative to the schedule metadata, so they
/// are fetched separately from reconciliation: callers first ask how many
/// bytes a batch would cost ([`pending_size`](Self::pending_size)), then
/// trigger the batch with a progress callback
/// ([`download_all`](Self::download_all)).
pub struct SampleDownloader<F> {
    store: EventStore,
    fetcher: F,
}

impl<F: SampleFetcher> SampleDownloader<F> {
    pub fn new(store: EventStore, fetcher: F) -> Self {
        Self { store, fetcher }
    }

    /// Records that reference a sample not yet downloaded.
    pub async fn pending_records(
        &self,
        category: Category,
    ) -> Result<Vec<EventRecord>, StoreError> {
        let records = self.store.get_all(category).await?;
        Ok(records.into_iter().filter(|r| r.needs_sample()).collect())
    }

    /// Total number of bytes the pending samples would download.
    ///
    /// Sizes come from concurrent header-only probes. A probe that fails
    /// or reports no length contributes zero, so the total is a floor, not
    /// a promise.
    pub async fn pending_size(&self, category: Category) -> Result<u64, StoreError> {
        let pending = self.pending_records(category).await?;
        Ok(self.probe_sizes(&pending).await.iter().sum())
    }

    /// Probe each record's sample link for its payload size. One entry per
    /// record, zero when the size could not be determined.
    async fn probe_sizes(&self, records: &[EventRecord]) -> Vec<u64> {
        future::join_all(records.iter().map(|record| async {
            match self.fetcher.content_length(&record.event.sample_link).await {
                Ok(Some(length)) => length,
                Ok(None) => 0,
                Err(e) => {
                    warn!(
                        key = %record.normalized_key,
                        error = %e,
                        "sample size probe failed"
                    );
                    0
                }
            }
        }))
        .await
    }

    /// Download every pending sample in `category`, attaching each payload
    /// to its record as it completes.
    ///
    /// Downloads run concurrently with no worker-pool bound; the record
    /// counts involved are tens, not thousands. `on_progress` is invoked
    /// after each completed attachment with the cumulative probed bytes so
    /// far and the batch total; the two are equal on the final call when
    /// every download succeeded. A fetch failure is confined to its record,
    /// which stays pending for a future call; only a storage failure
    /// aborts the batch.
    pub async fn download_all(
        &self,
        category: Category,
        mut on_progress: impl FnMut(u64, u64),
    ) -> Result<(), StoreError> {
        let pending = self.pending_records(category).await?;
        let sizes = self.probe_sizes(&pending).await;
        let total: u64 = sizes.iter().sum();

        debug!(
            category = category.store_name(),
            pending = pending.len(),
            total_bytes = total,
            "downloading samples"
        );

        let mut downloads: FuturesUnordered<_> = pending
            .into_iter()
            .zip(sizes)
            .map(|(record, size)| self.download_one(category, record, size))
            .collect();

        let mut downloaded = 0u64;
        while let Some(result) = downloads.next().await {
            if let Some(size) = result? {
                downloaded += size;
                on_progress(downloaded, total);
            }
        }
        Ok(())
    }

    /// Fetch one record's sample and persist it. `Ok(None)` when the fetch
    /// failed and the record stays pending.
    async fn download_one(
        &self,
        category: Category,
        mut record: EventRecord,
        size: u64,
    ) -> Result<Option<u64>, StoreError> {
        match self.fetcher.fetch_bytes(&record.event.sample_link).await {
            Ok(bytes) => {
                record.sample = Some(bytes);
                self.store.put(category, &record).await?;
                Ok(Some(size))
            }
            Err(e) => {
                warn!(
                    key = %record.normalized_key,
                    error = %e,
                    "sample download failed, record stays pending"
                );
                Ok(None)
            }
        }
    }
}
