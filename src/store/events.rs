use std::io;
use std::path::PathBuf;

use tracing::debug;

use crate::models::{Category, EventRecord};

use super::{StoreError, SyncStamp};

/// Store layout version. Bumped when the on-disk layout changes; upgrades
/// are additive only (missing category directories are created on open,
/// existing data is left in place).
const STORE_VERSION: u32 = 1;

/// Marker file holding the layout version, at the store root.
const VERSION_FILE: &str = "VERSION";

/// Directory holding per-category sync stamps, outside the keyspaces.
const STAMP_DIR: &str = ".sync";

/// Durable, per-category keyed store for schedule entries.
///
/// Each category owns an isolated directory under the store root; records
/// are stored one pretty-JSON file per key, named by the record's
/// normalized key. All operations are async and surface
/// [`StoreError::Unavailable`] when the backing directory cannot be
/// accessed; nothing is retried internally.
#[derive(Debug, Clone)]
pub struct EventStore {
    root: PathBuf,
}

impl EventStore {
    /// Open the store rooted at `root`, creating one directory per known
    /// category. Safe to call repeatedly; existing data is kept.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        for category in Category::ALL {
            tokio::fs::create_dir_all(root.join(category.store_name())).await?;
        }
        tokio::fs::create_dir_all(root.join(STAMP_DIR)).await?;

        let version_path = root.join(VERSION_FILE);
        match tokio::fs::read_to_string(&version_path).await {
            Ok(contents) => {
                let on_disk: u32 = contents.trim().parse().unwrap_or(0);
                if on_disk < STORE_VERSION {
                    debug!(from = on_disk, to = STORE_VERSION, "upgrading store layout");
                    tokio::fs::write(&version_path, STORE_VERSION.to_string()).await?;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tokio::fs::write(&version_path, STORE_VERSION.to_string()).await?;
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self { root })
    }

    fn record_path(&self, category: Category, key: &str) -> PathBuf {
        self.root
            .join(category.store_name())
            .join(format!("{key}.json"))
    }

    fn stamp_path(&self, category: Category) -> PathBuf {
        self.root
            .join(STAMP_DIR)
            .join(format!("{}.json", category.store_name()))
    }

    /// Fetch a single record by key. `Ok(None)` when the key is absent.
    pub async fn get(
        &self,
        category: Category,
        key: &str,
    ) -> Result<Option<EventRecord>, StoreError> {
        match tokio::fs::read_to_string(self.record_path(category, key)).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch every record in a category. No ordering guarantee; callers
    /// sort.
    pub async fn get_all(&self, category: Category) -> Result<Vec<EventRecord>, StoreError> {
        let dir = self.root.join(category.store_name());
        let mut entries = tokio::fs::read_dir(&dir).await?;
        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.ends_with(".json") {
                continue;
            }
            let contents = tokio::fs::read_to_string(entry.path()).await?;
            records.push(serde_json::from_str(&contents)?);
        }
        Ok(records)
    }

    /// Upsert a record under its normalized key, overwriting any previous
    /// version wholesale. Conflicting writes to the same key are last
    /// write wins.
    pub async fn put(&self, category: Category, record: &EventRecord) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(record)?;
        let path = self.record_path(category, &record.normalized_key);
        tokio::fs::write(path, contents).await?;
        Ok(())
    }

    /// Delete a record by key. Deleting an absent key is not an error.
    pub async fn delete(&self, category: Category, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.record_path(category, key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Records whose performance date falls within `[from, to]`, sorted by
    /// date. Dates compare lexicographically, matching the feed's
    /// zero-padded day labels. The reconciliation engine does not use this
    /// index; it exists for schedule views.
    pub async fn get_by_date_range(
        &self,
        category: Category,
        from: &str,
        to: &str,
    ) -> Result<Vec<EventRecord>, StoreError> {
        let mut records = self.get_all(category).await?;
        records.retain(|r| {
            r.event.performance_date.as_str() >= from && r.event.performance_date.as_str() <= to
        });
        records.sort_by(|a, b| a.event.performance_date.cmp(&b.event.performance_date));
        Ok(records)
    }

    /// Load the sync stamp for a category, if it has ever been synced.
    pub async fn load_stamp(&self, category: Category) -> Result<Option<SyncStamp>, StoreError> {
        match tokio::fs::read_to_string(self.stamp_path(category)).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Record that a category was just reconciled.
    pub async fn save_stamp(
        &self,
        category: Category,
        stamp: &SyncStamp,
    ) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(stamp)?;
        tokio::fs::write(self.stamp_path(category), contents).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RemoteEvent;

    fn record(key: &str, date: &str) -> EventRecord {
        EventRecord::new(
            key.to_string(),
            RemoteEvent {
                name: key.to_string(),
                performance_date: date.to_string(),
                ..RemoteEvent::default()
            },
        )
    }

    async fn temp_store() -> (tempfile::TempDir, EventStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = EventStore::open(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let (_dir, store) = temp_store().await;
        let record = record("DJKolya", "01");

        store.put(Category::Music, &record).await.unwrap();
        let loaded = store.get(Category::Music, "DJKolya").await.unwrap();
        assert_eq!(loaded, Some(record));
    }

    #[tokio::test]
    async fn test_get_absent_key_is_none() {
        let (_dir, store) = temp_store().await;
        assert_eq!(store.get(Category::Music, "nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_categories_are_isolated() {
        let (_dir, store) = temp_store().await;
        let record = record("Shared", "01");

        store.put(Category::Music, &record).await.unwrap();
        assert!(store.get(Category::Cinema, "Shared").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_ok() {
        let (_dir, store) = temp_store().await;
        store.delete(Category::Music, "nobody").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let (_dir, store) = temp_store().await;
        store.put(Category::Music, &record("A", "01")).await.unwrap();
        store.delete(Category::Music, "A").await.unwrap();
        assert!(store.get(Category::Music, "A").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all_returns_every_record() {
        let (_dir, store) = temp_store().await;
        store.put(Category::Music, &record("A", "01")).await.unwrap();
        store.put(Category::Music, &record("B", "02")).await.unwrap();

        let mut keys: Vec<String> = store
            .get_all(Category::Music)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.normalized_key)
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_empty_key_is_a_valid_slot() {
        let (_dir, store) = temp_store().await;
        store.put(Category::Music, &record("", "01")).await.unwrap();

        assert!(store.get(Category::Music, "").await.unwrap().is_some());
        assert_eq!(store.get_all(Category::Music).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reopen_keeps_data_and_version() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = EventStore::open(dir.path()).await.unwrap();
            store.put(Category::Music, &record("A", "01")).await.unwrap();
        }
        let store = EventStore::open(dir.path()).await.unwrap();
        assert!(store.get(Category::Music, "A").await.unwrap().is_some());

        let version = std::fs::read_to_string(dir.path().join(VERSION_FILE)).unwrap();
        assert_eq!(version.trim(), STORE_VERSION.to_string());
    }

    #[tokio::test]
    async fn test_date_range_scan_filters_and_sorts() {
        let (_dir, store) = temp_store().await;
        store.put(Category::Music, &record("C", "03")).await.unwrap();
        store.put(Category::Music, &record("A", "01")).await.unwrap();
        store.put(Category::Music, &record("B", "02")).await.unwrap();

        let dates: Vec<String> = store
            .get_by_date_range(Category::Music, "02", "03")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.event.performance_date)
            .collect();
        assert_eq!(dates, vec!["02", "03"]);
    }

    #[tokio::test]
    async fn test_stamp_round_trip() {
        let (_dir, store) = temp_store().await;
        assert!(store.load_stamp(Category::Music).await.unwrap().is_none());

        store
            .save_stamp(Category::Music, &SyncStamp::new(7))
            .await
            .unwrap();
        let stamp = store.load_stamp(Category::Music).await.unwrap().unwrap();
        assert_eq!(stamp.record_count, 7);
        // Stamps never appear in the category keyspace.
        assert!(store.get_all(Category::Music).await.unwrap().is_empty());
    }
}
