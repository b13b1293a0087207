use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::ListBridge;
use crate::catalog::CatalogRecord;
use crate::errors::AppError;
use crate::lists::ops;
use crate::lists::{
    FavoriteEntry, ListEntry, Patchable, ReadingListEntry, WatchlistEntry, WatchlistPatch,
};

/// String key/value storage in the style of a browser's local storage.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: String) -> Result<(), AppError>;
    fn remove_item(&self, key: &str) -> Result<(), AppError>;
}

#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), AppError> {
        self.items.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), AppError> {
        self.items.lock().remove(key);
        Ok(())
    }
}

/// All keys kept in one JSON object on disk, rewritten on every change.
pub struct FileStorage {
    items: Mutex<HashMap<String, String>>,
    file_path: PathBuf,
}

impl FileStorage {
    pub fn open(file_path: impl Into<PathBuf>) -> Self {
        let file_path = file_path.into();

        let items = if file_path.exists() {
            let content = fs::read_to_string(&file_path).unwrap_or_else(|_| "{}".to_string());
            serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Unreadable local storage at {:?}: {}", file_path, e);
                HashMap::new()
            })
        } else {
            HashMap::new()
        };

        Self {
            items: Mutex::new(items),
            file_path,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn save(&self, items: &HashMap<String, String>) -> Result<(), AppError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(items)?;
        fs::write(&self.file_path, content)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), AppError> {
        let mut items = self.items.lock();
        items.insert(key.to_string(), value);
        self.save(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), AppError> {
        let mut items = self.items.lock();
        if items.remove(key).is_some() {
            self.save(&items)?;
        }
        Ok(())
    }
}

/// Fallback bridge used when no bridge host is available. Lists are kept
/// as JSON strings under [`crate::lists::ListKind::storage_key`].
pub struct LocalStorageBridge<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> LocalStorageBridge<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    fn read<E: ListEntry>(&self) -> Vec<E> {
        let key = E::KIND.storage_key();
        let Some(raw) = self.storage.get_item(key) else {
            self.reset(key);
            return Vec::new();
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Corrupt {} in local storage ({}). Resetting", key, e);
            self.reset(key);
            Vec::new()
        })
    }

    fn reset(&self, key: &str) {
        if let Err(e) = self.storage.set_item(key, "[]".to_string()) {
            log::warn!("Failed to reset {} in local storage: {}", key, e);
        }
    }

    fn write<E: ListEntry>(&self, entries: &[E]) -> Result<(), AppError> {
        let raw = serde_json::to_string(entries)?;
        self.storage.set_item(E::KIND.storage_key(), raw)
    }

    fn add<E: ListEntry>(&self, record: &CatalogRecord) -> Result<Vec<E>, AppError> {
        let mut entries = self.read::<E>();
        if ops::insert_unique(&mut entries, E::from_record(record, Utc::now())) {
            self.write(&entries)?;
        }
        Ok(entries)
    }

    fn remove<E: ListEntry>(&self, mal_id: u64) -> Result<Vec<E>, AppError> {
        let mut entries = self.read::<E>();
        if ops::remove_by_id(&mut entries, mal_id) {
            self.write(&entries)?;
        }
        Ok(entries)
    }

    fn update<E: Patchable>(&self, mal_id: u64, patch: &E::Patch) -> Result<Vec<E>, AppError> {
        let mut entries = self.read::<E>();
        if ops::patch_by_id(&mut entries, mal_id, patch) {
            self.write(&entries)?;
        }
        Ok(entries)
    }
}

#[async_trait]
impl<S: KeyValueStorage> ListBridge for LocalStorageBridge<S> {
    fn name(&self) -> &str {
        "local_storage"
    }

    async fn get_watchlist(&self) -> Result<Vec<WatchlistEntry>, AppError> {
        Ok(self.read())
    }

    async fn add_to_watchlist(&self, record: CatalogRecord) -> Result<Vec<WatchlistEntry>, AppError> {
        self.add(&record)
    }

    async fn remove_from_watchlist(&self, mal_id: u64) -> Result<Vec<WatchlistEntry>, AppError> {
        self.remove(mal_id)
    }

    async fn update_watchlist(
        &self,
        mal_id: u64,
        updates: WatchlistPatch,
    ) -> Result<Vec<WatchlistEntry>, AppError> {
        self.update::<WatchlistEntry>(mal_id, &updates)
    }

    async fn get_readinglist(&self) -> Result<Vec<ReadingListEntry>, AppError> {
        Ok(self.read())
    }

    async fn add_to_readinglist(
        &self,
        record: CatalogRecord,
    ) -> Result<Vec<ReadingListEntry>, AppError> {
        self.add(&record)
    }

    async fn remove_from_readinglist(&self, mal_id: u64) -> Result<Vec<ReadingListEntry>, AppError> {
        self.remove(mal_id)
    }

    async fn get_favorites(&self) -> Result<Vec<FavoriteEntry>, AppError> {
        Ok(self.read())
    }

    async fn add_to_favorites(&self, record: CatalogRecord) -> Result<Vec<FavoriteEntry>, AppError> {
        self.add(&record)
    }

    async fn remove_from_favorites(&self, mal_id: u64) -> Result<Vec<FavoriteEntry>, AppError> {
        self.remove(mal_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lists::ListKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_corrupt_value_is_reset() {
        let storage = MemoryStorage::new();
        storage
            .set_item(ListKind::Watchlist.storage_key(), "not json".to_string())
            .unwrap();
        let bridge = LocalStorageBridge::new(storage);

        assert!(bridge.get_watchlist().await.unwrap().is_empty());
        assert_eq!(
            bridge.storage.get_item("watchlist").as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let bridge = LocalStorageBridge::new(MemoryStorage::new());
        let record = CatalogRecord::new(5114, "X");

        bridge.add_to_watchlist(record.clone()).await.unwrap();
        let entries = bridge.add_to_watchlist(record).await.unwrap();

        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_file_storage_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local_storage.json");

        {
            let bridge = LocalStorageBridge::new(FileStorage::open(&path));
            bridge
                .add_to_readinglist(CatalogRecord::new(2, "Berserk"))
                .await
                .unwrap();
        }

        let reopened = LocalStorageBridge::new(FileStorage::open(&path));
        let entries = reopened.get_readinglist().await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Berserk");
    }

    #[test]
    fn test_file_storage_remove_item() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path().join("ls.json"));

        storage.set_item("k", "v".to_string()).unwrap();
        storage.remove_item("k").unwrap();

        assert_eq!(storage.get_item("k"), None);
        let reopened = FileStorage::open(storage.file_path());
        assert_eq!(reopened.get_item("k"), None);
    }

    #[test]
    fn test_unreadable_storage_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ls.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let storage = FileStorage::open(&path);

        assert_eq!(storage.get_item("watchlist"), None);
    }
}
