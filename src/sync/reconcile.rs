use std::collections::{HashMap, HashSet};

use futures::future;
use tracing::debug;

use crate::models::{Category, EventRecord, RemoteEvent};
use crate::store::{EventStore, StoreError, SyncStamp};

/// Merge one remote record over the local record with the same key, if any.
///
/// Remote metadata wins on every shared field. The downloaded sample is
/// kept only while the sample link is unchanged; a changed link leaves the
/// record pending re-download. The favorite flag is carried over verbatim.
/// The key field is forced to the derived key so merged data can never
/// move a record to a different slot.
fn merge(key: String, remote: &RemoteEvent, existing: Option<&EventRecord>) -> EventRecord {
    let sample = existing.and_then(|prev| {
        if prev.event.sample_link == remote.sample_link {
            prev.sample.clone()
        } else {
            None
        }
    });
    EventRecord {
        normalized_key: key,
        event: remote.clone(),
        sample,
        favorite: existing.is_some_and(|prev| prev.favorite),
    }
}

/// Reconcile `category` against the latest remote snapshot.
///
/// Local records whose key no longer appears remotely are deleted; every
/// remote record is merged over its local counterpart and written back.
/// The two passes target disjoint key sets, so they are dispatched
/// together and the call resolves once every write has settled. The first
/// storage failure is surfaced after settlement; writes that already
/// landed stay in place, and the caller decides whether to re-run the
/// category. An empty remote set clears the category.
///
/// Remote records that derive the same key overwrite each other in
/// undefined order within one pass; the feed is expected to keep identity
/// fields unique per category.
pub async fn reconcile(
    store: &EventStore,
    category: Category,
    remote: &[RemoteEvent],
) -> Result<(), StoreError> {
    let local: HashMap<String, EventRecord> = store
        .get_all(category)
        .await?
        .into_iter()
        .map(|record| (record.normalized_key.clone(), record))
        .collect();

    let remote_keys: HashSet<String> = remote.iter().map(|r| category.derive_key(r)).collect();

    let stale: Vec<&String> = local
        .keys()
        .filter(|key| !remote_keys.contains(*key))
        .collect();

    debug!(
        category = category.store_name(),
        remote = remote.len(),
        stale = stale.len(),
        "reconciling category"
    );

    let deletes = future::join_all(stale.iter().map(|key| store.delete(category, key.as_str())));
    let puts = future::join_all(remote.iter().map(|record| {
        let key = category.derive_key(record);
        let merged = merge(key.clone(), record, local.get(&key));
        async move { store.put(category, &merged).await }
    }));

    let (delete_results, put_results) = future::join(deletes, puts).await;
    for result in delete_results.into_iter().chain(put_results) {
        result?;
    }

    store
        .save_stamp(category, &SyncStamp::new(remote_keys.len()))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAT: Category = Category::Music;

    fn remote(name: &str, sample_link: &str, date: &str) -> RemoteEvent {
        RemoteEvent {
            name: name.to_string(),
            sample_link: sample_link.to_string(),
            performance_date: date.to_string(),
            ..RemoteEvent::default()
        }
    }

    async fn temp_store() -> (tempfile::TempDir, EventStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::open(dir.path()).await.unwrap();
        (dir, store)
    }

    async fn snapshot(store: &EventStore) -> Vec<EventRecord> {
        let mut records = store.get_all(CAT).await.unwrap();
        records.sort_by(|a, b| a.normalized_key.cmp(&b.normalized_key));
        records
    }

    #[tokio::test]
    async fn test_first_sync_creates_records_with_default_local_state() {
        let (_dir, store) = temp_store().await;
        reconcile(&store, CAT, &[remote("A", "", "Day1")])
            .await
            .unwrap();

        let records = snapshot(&store).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].normalized_key, "A");
        assert_eq!(records[0].event.performance_date, "Day1");
        assert!(records[0].sample.is_none());
        assert!(!records[0].favorite);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let (_dir, store) = temp_store().await;
        let rows = vec![remote("A", "x", "Day1"), remote("B", "", "Day2")];

        reconcile(&store, CAT, &rows).await.unwrap();
        let first = snapshot(&store).await;
        reconcile(&store, CAT, &rows).await.unwrap();
        let second = snapshot(&store).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_sample_preserved_when_link_unchanged() {
        let (_dir, store) = temp_store().await;
        reconcile(&store, CAT, &[remote("A", "x", "Day1")])
            .await
            .unwrap();

        let mut record = store.get(CAT, "A").await.unwrap().unwrap();
        record.sample = Some(vec![1, 2, 3]);
        store.put(CAT, &record).await.unwrap();

        // Metadata changes, sample link does not.
        reconcile(&store, CAT, &[remote("A", "x", "Day2")])
            .await
            .unwrap();

        let record = store.get(CAT, "A").await.unwrap().unwrap();
        assert_eq!(record.event.performance_date, "Day2");
        assert_eq!(record.sample, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_sample_cleared_when_link_changes() {
        let (_dir, store) = temp_store().await;
        reconcile(&store, CAT, &[remote("A", "x", "Day1")])
            .await
            .unwrap();

        let mut record = store.get(CAT, "A").await.unwrap().unwrap();
        record.sample = Some(vec![1, 2, 3]);
        store.put(CAT, &record).await.unwrap();

        reconcile(&store, CAT, &[remote("A", "y", "Day1")])
            .await
            .unwrap();

        let record = store.get(CAT, "A").await.unwrap().unwrap();
        assert_eq!(record.event.sample_link, "y");
        assert!(record.sample.is_none());
    }

    #[tokio::test]
    async fn test_records_missing_remotely_are_deleted() {
        let (_dir, store) = temp_store().await;
        reconcile(&store, CAT, &[remote("A", "", "Day1"), remote("B", "", "Day1")])
            .await
            .unwrap();

        reconcile(&store, CAT, &[remote("A", "", "Day1")])
            .await
            .unwrap();

        assert!(store.get(CAT, "A").await.unwrap().is_some());
        assert!(store.get(CAT, "B").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_remote_set_clears_category() {
        let (_dir, store) = temp_store().await;
        reconcile(&store, CAT, &[remote("A", "", "Day1"), remote("B", "", "Day1")])
            .await
            .unwrap();

        reconcile(&store, CAT, &[]).await.unwrap();
        assert!(snapshot(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_favorite_survives_reconcile() {
        let (_dir, store) = temp_store().await;
        reconcile(&store, CAT, &[remote("A", "", "Day1")])
            .await
            .unwrap();

        let mut record = store.get(CAT, "A").await.unwrap().unwrap();
        record.favorite = true;
        store.put(CAT, &record).await.unwrap();

        reconcile(&store, CAT, &[remote("A", "", "Day3")])
            .await
            .unwrap();

        let record = store.get(CAT, "A").await.unwrap().unwrap();
        assert!(record.favorite);
        assert_eq!(record.event.performance_date, "Day3");
    }

    #[tokio::test]
    async fn test_remote_metadata_wins_on_shared_fields() {
        let (_dir, store) = temp_store().await;
        let mut first = remote("A", "x", "Day1");
        first.stage = "Main".to_string();
        reconcile(&store, CAT, &[first]).await.unwrap();

        let mut second = remote("A", "x", "Day1");
        second.stage = "Forest".to_string();
        reconcile(&store, CAT, &[second]).await.unwrap();

        let record = store.get(CAT, "A").await.unwrap().unwrap();
        assert_eq!(record.event.stage, "Forest");
    }

    #[tokio::test]
    async fn test_key_derivation_ignores_punctuation_edits() {
        let (_dir, store) = temp_store().await;
        reconcile(&store, CAT, &[remote("D.J. Kolya", "x", "Day1")])
            .await
            .unwrap();

        let mut record = store.get(CAT, "DJKolya").await.unwrap().unwrap();
        record.sample = Some(vec![9]);
        store.put(CAT, &record).await.unwrap();

        // Same identity once normalized: still one record, sample kept.
        reconcile(&store, CAT, &[remote("DJ Kolya", "x", "Day1")])
            .await
            .unwrap();

        let records = snapshot(&store).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].normalized_key, "DJKolya");
        assert_eq!(records[0].sample, Some(vec![9]));
    }

    #[tokio::test]
    async fn test_stamp_written_after_successful_pass() {
        let (_dir, store) = temp_store().await;
        assert!(store.load_stamp(CAT).await.unwrap().is_none());

        reconcile(&store, CAT, &[remote("A", "", "Day1"), remote("B", "", "Day1")])
            .await
            .unwrap();

        let stamp = store.load_stamp(CAT).await.unwrap().unwrap();
        assert_eq!(stamp.record_count, 2);
    }

    #[test]
    fn test_merge_new_record_gets_defaults() {
        let merged = merge("A".to_string(), &remote("A", "x", "Day1"), None);
        assert_eq!(merged.normalized_key, "A");
        assert!(merged.sample.is_none());
        assert!(!merged.favorite);
    }

    #[test]
    fn test_merge_forces_derived_key() {
        let existing = EventRecord::new("Other".to_string(), remote("Other", "x", "Day1"));
        let merged = merge("A".to_string(), &remote("A!", "x", "Day1"), Some(&existing));
        assert_eq!(merged.normalized_key, "A");
    }
}
