//! Top-level database handle.
//!
//! `ScheduleDb` ties the persistent store, the reconciliation engine, and
//! the sample downloader together behind the surface the UI layer
//! consumes. The UI fetches remote rows itself (via
//! [`crate::api::SourceClient`] or otherwise) and hands them to
//! [`reconcile`](ScheduleDb::reconcile); everything else operates on the
//! local store alone, so the schedule keeps working offline.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::favorites;
use crate::models::{Category, EventRecord, RemoteEvent};
use crate::samples::{HttpSampleFetcher, SampleDownloader};
use crate::store::{EventStore, StoreError, SyncStamp};
use crate::sync;

/// Durable schedule database: one keyed store per category plus the sync
/// and download machinery operating on it.
pub struct ScheduleDb {
    store: EventStore,
    samples: SampleDownloader<HttpSampleFetcher>,
}

impl ScheduleDb {
    /// Open the database rooted at `data_dir`, creating it on first use.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        let store = EventStore::open(&data_dir).await?;
        let samples = SampleDownloader::new(store.clone(), HttpSampleFetcher::new()?);
        info!(data_dir = %data_dir.display(), "schedule database opened");
        Ok(Self { store, samples })
    }

    /// Reconcile a category against freshly fetched remote rows.
    pub async fn reconcile(
        &self,
        category: Category,
        remote: &[RemoteEvent],
    ) -> Result<(), StoreError> {
        sync::reconcile(&self.store, category, remote).await
    }

    /// Every record in a category, unordered.
    pub async fn get_all(&self, category: Category) -> Result<Vec<EventRecord>, StoreError> {
        self.store.get_all(category).await
    }

    /// Records still waiting for their sample download.
    pub async fn pending_records(
        &self,
        category: Category,
    ) -> Result<Vec<EventRecord>, StoreError> {
        self.samples.pending_records(category).await
    }

    /// Bytes a [`download_all`](Self::download_all) call would fetch.
    pub async fn pending_size(&self, category: Category) -> Result<u64, StoreError> {
        self.samples.pending_size(category).await
    }

    /// Download all pending samples for a category, reporting progress.
    pub async fn download_all(
        &self,
        category: Category,
        on_progress: impl FnMut(u64, u64),
    ) -> Result<(), StoreError> {
        self.samples.download_all(category, on_progress).await
    }

    /// Flip a record's favorite flag and return the updated record.
    pub async fn toggle_favorite(
        &self,
        category: Category,
        record: &EventRecord,
    ) -> Result<EventRecord, StoreError> {
        favorites::toggle_favorite(&self.store, category, record).await
    }

    /// Favorite records across every category.
    pub async fn all_favorites(&self) -> Result<Vec<(Category, EventRecord)>, StoreError> {
        favorites::all_favorites(&self.store).await
    }

    /// When the category was last successfully reconciled, if ever.
    pub async fn last_synced(&self, category: Category) -> Result<Option<SyncStamp>, StoreError> {
        self.store.load_stamp(category).await
    }

    /// Direct access to the underlying store, for callers that need the
    /// date index or raw key lookups.
    pub fn store(&self) -> &EventStore {
        &self.store
    }
}
