use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::ipc::{dispatch, BridgeOp, BridgeRequest, BridgeResponse};
use super::ListBridge;
use crate::catalog::CatalogRecord;
use crate::errors::AppError;
use crate::lists::{FavoriteEntry, ReadingListEntry, WatchlistEntry, WatchlistPatch};

struct Envelope {
    request: BridgeRequest,
    reply: oneshot::Sender<BridgeResponse>,
}

/// Message-passing bridge. Calls become JSON envelopes served by a
/// [`BridgeHost`] task, so only serialized data crosses between the two.
#[derive(Clone)]
pub struct ChannelBridge {
    tx: mpsc::Sender<Envelope>,
}

/// The serving side of a [`ChannelBridge`].
pub struct BridgeHost {
    handle: JoinHandle<()>,
    shutdown_tx: oneshot::Sender<()>,
}

/// Starts a host task serving `target` and returns a connected bridge.
///
/// The host handles one request at a time, in arrival order.
pub fn spawn_host(target: Arc<dyn ListBridge>, capacity: usize) -> (ChannelBridge, BridgeHost) {
    let (tx, mut rx) = mpsc::channel::<Envelope>(capacity.max(1));
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        log::info!("Bridge host started (serving {})", target.name());
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                envelope = rx.recv() => {
                    let Some(Envelope { request, reply }) = envelope else {
                        break;
                    };
                    log::debug!("Bridge host serving {} ({})", request.op, request.id);
                    let response = dispatch(target.as_ref(), &request).await;
                    if reply.send(response).is_err() {
                        log::debug!("Caller for {} went away before the reply", request.id);
                    }
                }
            }
        }
        log::info!("Bridge host stopped");
    });

    (
        ChannelBridge { tx },
        BridgeHost {
            handle,
            shutdown_tx,
        },
    )
}

impl BridgeHost {
    /// Stops serving and waits for the host task to exit. A request already
    /// being served completes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.handle.await {
            log::warn!("Bridge host task ended abnormally: {}", e);
        }
    }
}

impl ChannelBridge {
    async fn call<T: DeserializeOwned>(&self, op: BridgeOp, args: Value) -> Result<T, AppError> {
        let request = BridgeRequest::new(op, args);
        let id = request.id.clone();
        let (reply, reply_rx) = oneshot::channel();

        self.tx
            .send(Envelope { request, reply })
            .await
            .map_err(|_| AppError::Bridge(format!("{}: bridge host is not running", op)))?;

        let response = reply_rx
            .await
            .map_err(|_| AppError::Bridge(format!("{}: bridge host dropped the request", op)))?;

        if response.id != id {
            return Err(AppError::Bridge(format!(
                "{}: response id {} does not match request {}",
                op, response.id, id
            )));
        }

        Ok(serde_json::from_value(response.result?)?)
    }
}

#[async_trait]
impl ListBridge for ChannelBridge {
    fn name(&self) -> &str {
        "channel"
    }

    async fn get_watchlist(&self) -> Result<Vec<WatchlistEntry>, AppError> {
        self.call(BridgeOp::GetWatchlist, Value::Null).await
    }

    async fn add_to_watchlist(&self, record: CatalogRecord) -> Result<Vec<WatchlistEntry>, AppError> {
        self.call(BridgeOp::AddToWatchlist, json!({ "record": record }))
            .await
    }

    async fn remove_from_watchlist(&self, mal_id: u64) -> Result<Vec<WatchlistEntry>, AppError> {
        self.call(BridgeOp::RemoveFromWatchlist, json!({ "mal_id": mal_id }))
            .await
    }

    async fn update_watchlist(
        &self,
        mal_id: u64,
        updates: WatchlistPatch,
    ) -> Result<Vec<WatchlistEntry>, AppError> {
        self.call(
            BridgeOp::UpdateWatchlist,
            json!({ "mal_id": mal_id, "updates": updates }),
        )
        .await
    }

    async fn get_readinglist(&self) -> Result<Vec<ReadingListEntry>, AppError> {
        self.call(BridgeOp::GetReadinglist, Value::Null).await
    }

    async fn add_to_readinglist(
        &self,
        record: CatalogRecord,
    ) -> Result<Vec<ReadingListEntry>, AppError> {
        self.call(BridgeOp::AddToReadinglist, json!({ "record": record }))
            .await
    }

    async fn remove_from_readinglist(&self, mal_id: u64) -> Result<Vec<ReadingListEntry>, AppError> {
        self.call(BridgeOp::RemoveFromReadinglist, json!({ "mal_id": mal_id }))
            .await
    }

    async fn get_favorites(&self) -> Result<Vec<FavoriteEntry>, AppError> {
        self.call(BridgeOp::GetFavorites, Value::Null).await
    }

    async fn add_to_favorites(&self, record: CatalogRecord) -> Result<Vec<FavoriteEntry>, AppError> {
        self.call(BridgeOp::AddToFavorites, json!({ "record": record }))
            .await
    }

    async fn remove_from_favorites(&self, mal_id: u64) -> Result<Vec<FavoriteEntry>, AppError> {
        self.call(BridgeOp::RemoveFromFavorites, json!({ "mal_id": mal_id }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{LocalStorageBridge, MemoryStorage};

    fn local_target() -> Arc<dyn ListBridge> {
        Arc::new(LocalStorageBridge::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_calls_round_trip_through_host() {
        let (bridge, host) = spawn_host(local_target(), 4);

        let entries = bridge
            .add_to_watchlist(CatalogRecord::new(5114, "X"))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mal_id, 5114);

        let fetched = bridge.get_watchlist().await.unwrap();
        assert_eq!(fetched, entries);

        assert!(!host.handle.is_finished());
        host.shutdown().await;
    }

    #[tokio::test]
    async fn test_call_after_shutdown_is_bridge_error() {
        let (bridge, host) = spawn_host(local_target(), 4);
        host.shutdown().await;

        let err = bridge.get_favorites().await.unwrap_err();

        assert!(matches!(err, AppError::Bridge(_)));
        assert!(bridge.tx.is_closed());
    }

    #[tokio::test]
    async fn test_host_errors_are_returned_to_caller() {
        struct BrokenDisk;

        #[async_trait]
        impl ListBridge for BrokenDisk {
            fn name(&self) -> &str {
                "broken"
            }
            async fn get_watchlist(&self) -> Result<Vec<WatchlistEntry>, AppError> {
                Ok(Vec::new())
            }
            async fn add_to_watchlist(&self, _: CatalogRecord) -> Result<Vec<WatchlistEntry>, AppError> {
                Err(AppError::FileSystem("read-only file system".to_string()))
            }
            async fn remove_from_watchlist(&self, _: u64) -> Result<Vec<WatchlistEntry>, AppError> {
                Ok(Vec::new())
            }
            async fn update_watchlist(
                &self,
                _: u64,
                _: WatchlistPatch,
            ) -> Result<Vec<WatchlistEntry>, AppError> {
                Ok(Vec::new())
            }
            async fn get_readinglist(&self) -> Result<Vec<ReadingListEntry>, AppError> {
                Ok(Vec::new())
            }
            async fn add_to_readinglist(
                &self,
                _: CatalogRecord,
            ) -> Result<Vec<ReadingListEntry>, AppError> {
                Ok(Vec::new())
            }
            async fn remove_from_readinglist(
                &self,
                _: u64,
            ) -> Result<Vec<ReadingListEntry>, AppError> {
                Ok(Vec::new())
            }
            async fn get_favorites(&self) -> Result<Vec<FavoriteEntry>, AppError> {
                Ok(Vec::new())
            }
            async fn add_to_favorites(&self, _: CatalogRecord) -> Result<Vec<FavoriteEntry>, AppError> {
                Ok(Vec::new())
            }
            async fn remove_from_favorites(&self, _: u64) -> Result<Vec<FavoriteEntry>, AppError> {
                Ok(Vec::new())
            }
        }

        let (bridge, host) = spawn_host(Arc::new(BrokenDisk), 1);

        let err = bridge
            .add_to_watchlist(CatalogRecord::new(1, "A"))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::FileSystem("read-only file system".to_string()));
        host.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_callers_all_get_replies() {
        let (bridge, host) = spawn_host(local_target(), 2);

        let mut tasks = Vec::new();
        for id in 1..=8u64 {
            let bridge = bridge.clone();
            tasks.push(tokio::spawn(async move {
                bridge
                    .add_to_favorites(CatalogRecord::new(id, format!("C{}", id)))
                    .await
            }));
        }
        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }

        // The host serialises requests, so no add is lost here.
        assert_eq!(bridge.get_favorites().await.unwrap().len(), 8);
        host.shutdown().await;
    }
}
