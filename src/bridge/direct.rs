use async_trait::async_trait;
use std::sync::Arc;

use super::ListBridge;
use crate::catalog::CatalogRecord;
use crate::errors::AppError;
use crate::lists::{FavoriteEntry, ListStore, ReadingListEntry, WatchlistEntry, WatchlistPatch};

/// In-process bridge: every call goes straight to the list store.
pub struct DirectBridge {
    store: Arc<ListStore>,
}

impl DirectBridge {
    pub fn new(store: Arc<ListStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ListBridge for DirectBridge {
    fn name(&self) -> &str {
        "direct"
    }

    async fn get_watchlist(&self) -> Result<Vec<WatchlistEntry>, AppError> {
        Ok(self.store.get().await)
    }

    async fn add_to_watchlist(&self, record: CatalogRecord) -> Result<Vec<WatchlistEntry>, AppError> {
        self.store.add(&record).await
    }

    async fn remove_from_watchlist(&self, mal_id: u64) -> Result<Vec<WatchlistEntry>, AppError> {
        self.store.remove(mal_id).await
    }

    async fn update_watchlist(
        &self,
        mal_id: u64,
        updates: WatchlistPatch,
    ) -> Result<Vec<WatchlistEntry>, AppError> {
        self.store.update::<WatchlistEntry>(mal_id, &updates).await
    }

    async fn get_readinglist(&self) -> Result<Vec<ReadingListEntry>, AppError> {
        Ok(self.store.get().await)
    }

    async fn add_to_readinglist(
        &self,
        record: CatalogRecord,
    ) -> Result<Vec<ReadingListEntry>, AppError> {
        self.store.add(&record).await
    }

    async fn remove_from_readinglist(&self, mal_id: u64) -> Result<Vec<ReadingListEntry>, AppError> {
        self.store.remove(mal_id).await
    }

    async fn get_favorites(&self) -> Result<Vec<FavoriteEntry>, AppError> {
        Ok(self.store.get().await)
    }

    async fn add_to_favorites(&self, record: CatalogRecord) -> Result<Vec<FavoriteEntry>, AppError> {
        self.store.add(&record).await
    }

    async fn remove_from_favorites(&self, mal_id: u64) -> Result<Vec<FavoriteEntry>, AppError> {
        self.store.remove(mal_id).await
    }
}
