//! Request/response surface between the list store and the rendering layer.
//!
//! The UI talks to a [`ListBridge`] and never to the store directly. Three
//! implementations share the same contract:
//!
//! ```text
//! DirectBridge        -> ListStore (same process)
//! ChannelBridge       -> BridgeHost task -> any ListBridge (JSON envelopes)
//! LocalStorageBridge  -> KeyValueStorage (host unavailable)
//! ```
//!
//! Every mutation returns the whole updated list, and every implementation
//! applies the same projection defaults and the same dedupe-by-`mal_id` rule.

pub mod channel;
pub mod direct;
pub mod ipc;
pub mod local_storage;

use async_trait::async_trait;

use crate::catalog::CatalogRecord;
use crate::errors::AppError;
use crate::lists::{FavoriteEntry, ReadingListEntry, WatchlistEntry, WatchlistPatch};

pub use channel::{spawn_host, BridgeHost, ChannelBridge};
pub use direct::DirectBridge;
pub use ipc::{dispatch, BridgeOp, BridgeRequest, BridgeResponse};
pub use local_storage::{FileStorage, KeyValueStorage, LocalStorageBridge, MemoryStorage};

#[async_trait]
pub trait ListBridge: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    async fn get_watchlist(&self) -> Result<Vec<WatchlistEntry>, AppError>;
    async fn add_to_watchlist(&self, record: CatalogRecord) -> Result<Vec<WatchlistEntry>, AppError>;
    async fn remove_from_watchlist(&self, mal_id: u64) -> Result<Vec<WatchlistEntry>, AppError>;
    async fn update_watchlist(
        &self,
        mal_id: u64,
        updates: WatchlistPatch,
    ) -> Result<Vec<WatchlistEntry>, AppError>;

    async fn get_readinglist(&self) -> Result<Vec<ReadingListEntry>, AppError>;
    async fn add_to_readinglist(
        &self,
        record: CatalogRecord,
    ) -> Result<Vec<ReadingListEntry>, AppError>;
    async fn remove_from_readinglist(&self, mal_id: u64) -> Result<Vec<ReadingListEntry>, AppError>;

    async fn get_favorites(&self) -> Result<Vec<FavoriteEntry>, AppError>;
    async fn add_to_favorites(&self, record: CatalogRecord) -> Result<Vec<FavoriteEntry>, AppError>;
    async fn remove_from_favorites(&self, mal_id: u64) -> Result<Vec<FavoriteEntry>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lists::{ListStore, WatchStatus};
    use serde_json::Value;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Entries as JSON with the creation timestamp removed, for comparing
    /// runs that happened at different instants.
    fn comparable<T: serde::Serialize>(entries: &[T]) -> Vec<Value> {
        entries
            .iter()
            .map(|e| {
                let mut v = serde_json::to_value(e).unwrap();
                v.as_object_mut().unwrap().remove("added_at");
                v
            })
            .collect()
    }

    /// Runs one fixed session of calls and records every returned list.
    async fn run_session(bridge: &dyn ListBridge) -> Vec<Vec<Value>> {
        let mut record = CatalogRecord::new(5114, "Fullmetal Alchemist: Brotherhood");
        record.episodes = Some(64);
        record.score = Some(9.1);
        let mut manga = CatalogRecord::new(2, "Berserk");
        manga.chapters = None;
        let mut character = CatalogRecord::new(11, "");
        character.title = None;
        character.name = Some("Edward Elric".to_string());
        character.favorites = Some(90000);

        let mut log = Vec::new();
        log.push(comparable(&bridge.get_watchlist().await.unwrap()));
        log.push(comparable(&bridge.add_to_watchlist(record.clone()).await.unwrap()));
        log.push(comparable(&bridge.add_to_watchlist(record.clone()).await.unwrap()));
        log.push(comparable(
            &bridge.add_to_watchlist(CatalogRecord::new(1, "Cowboy Bebop")).await.unwrap(),
        ));
        log.push(comparable(
            &bridge
                .update_watchlist(
                    5114,
                    WatchlistPatch {
                        episodes_watched: Some(10),
                        status: Some(WatchStatus::Watching),
                        ..Default::default()
                    },
                )
                .await
                .unwrap(),
        ));
        log.push(comparable(
            &bridge.update_watchlist(999, WatchlistPatch::default()).await.unwrap(),
        ));
        log.push(comparable(&bridge.remove_from_watchlist(1).await.unwrap()));
        log.push(comparable(&bridge.remove_from_watchlist(1).await.unwrap()));
        log.push(comparable(&bridge.add_to_readinglist(manga.clone()).await.unwrap()));
        log.push(comparable(&bridge.add_to_readinglist(manga).await.unwrap()));
        log.push(comparable(&bridge.remove_from_readinglist(2).await.unwrap()));
        log.push(comparable(&bridge.add_to_favorites(character.clone()).await.unwrap()));
        log.push(comparable(&bridge.add_to_favorites(character).await.unwrap()));
        log.push(comparable(&bridge.get_favorites().await.unwrap()));
        log.push(comparable(&bridge.remove_from_favorites(11).await.unwrap()));
        log.push(comparable(&bridge.get_readinglist().await.unwrap()));
        log
    }

    #[tokio::test]
    async fn test_all_bridges_are_observably_equivalent() {
        let dir = TempDir::new().unwrap();

        let direct = DirectBridge::new(Arc::new(ListStore::new(dir.path().join("direct"))));
        let direct_log = run_session(&direct).await;

        let target = Arc::new(DirectBridge::new(Arc::new(ListStore::new(
            dir.path().join("channel"),
        ))));
        let (channel, host) = spawn_host(target, 8);
        let channel_log = run_session(&channel).await;
        host.shutdown().await;

        let local = LocalStorageBridge::new(MemoryStorage::new());
        let local_log = run_session(&local).await;

        assert_eq!(direct_log, channel_log);
        assert_eq!(direct_log, local_log);
    }

    #[tokio::test]
    async fn test_session_results_match_expected_shape() {
        let local = LocalStorageBridge::new(MemoryStorage::new());
        let log = run_session(&local).await;

        assert!(log[0].is_empty());
        assert_eq!(log[1].len(), 1);
        assert_eq!(log[1][0]["status"], "planning");
        assert_eq!(log[1][0]["episodes_watched"], 0);
        assert_eq!(log[2], log[1]);
        assert_eq!(log[4][0]["episodes_watched"], 10);
        assert_eq!(log[4][0]["status"], "watching");
        assert_eq!(log[5], log[4]);
        assert_eq!(log[6].len(), 1);
        assert_eq!(log[6][0]["mal_id"], 5114);
        assert_eq!(log[12].len(), 1);
        assert_eq!(log[12][0]["name"], "Edward Elric");
        assert!(log[14].is_empty());
        assert!(log[15].is_empty());
    }
}
