//! Favorite flag management.
//!
//! Favorites are local-only state layered on top of synced records: the
//! flag defaults to off, is flipped here, and is deliberately ignored by
//! reconciliation so a schedule refresh never loses it.

use futures::future;

use crate::models::{Category, EventRecord};
use crate::store::{EventStore, StoreError};

/// Flip the favorite flag on `record` and write the full record back.
///
/// Returns the updated record. The write goes through the store's
/// last-write-wins upsert; toggles originate from a single UI thread of
/// control, so no read-modify-write guard is layered on top.
pub async fn toggle_favorite(
    store: &EventStore,
    category: Category,
    record: &EventRecord,
) -> Result<EventRecord, StoreError> {
    let mut updated = record.clone();
    updated.favorite = !updated.favorite;
    store.put(category, &updated).await?;
    Ok(updated)
}

/// Collect favorite records across every category, for the combined
/// favorites view.
pub async fn all_favorites(
    store: &EventStore,
) -> Result<Vec<(Category, EventRecord)>, StoreError> {
    let per_category = future::join_all(Category::ALL.into_iter().map(|category| async move {
        store
            .get_all(category)
            .await
            .map(|records| (category, records))
    }))
    .await;

    let mut favorites = Vec::new();
    for result in per_category {
        let (category, records) = result?;
        favorites.extend(
            records
                .into_iter()
                .filter(|record| record.favorite)
                .map(|record| (category, record)),
        );
    }
    Ok(favorites)
}
