use parking_lot::Mutex;
use std::sync::Arc;

use crate::bridge::{
    spawn_host, BridgeHost, DirectBridge, FileStorage, ListBridge, LocalStorageBridge,
    MemoryStorage,
};
use crate::catalog::{CatalogProvider, JikanClient};
use crate::config::{AppConfig, BridgeMode};
use crate::errors::AppError;
use crate::lists::ListStore;

pub const LOCAL_STORAGE_FILE: &str = "local_storage.json";

/// Everything one application instance needs, built once at startup and
/// handed to the desktop shell. Call [`AppContext::shutdown`] before exit.
pub struct AppContext {
    bridge: Arc<dyn ListBridge>,
    catalog: Arc<dyn CatalogProvider>,
    host: Mutex<Option<BridgeHost>>,
}

impl AppContext {
    pub async fn startup(config: AppConfig) -> Result<Self, AppError> {
        let catalog: Arc<dyn CatalogProvider> = Arc::new(JikanClient::new(&config)?);
        Self::startup_with_catalog(config, catalog).await
    }

    pub async fn startup_with_catalog(
        config: AppConfig,
        catalog: Arc<dyn CatalogProvider>,
    ) -> Result<Self, AppError> {
        config.validate()?;

        let store = Arc::new(ListStore::new(&config.data_dir));
        let data_dir_ok = match store.ensure_data_dir().await {
            Ok(()) => true,
            Err(e) => {
                log::warn!(
                    "Data directory {:?} unavailable ({}). Falling back to in-memory local storage",
                    config.data_dir,
                    e
                );
                false
            }
        };

        let (bridge, host): (Arc<dyn ListBridge>, Option<BridgeHost>) =
            match (config.bridge_mode, data_dir_ok) {
                (_, false) => {
                    let fallback: Arc<dyn ListBridge> =
                        Arc::new(LocalStorageBridge::new(MemoryStorage::new()));
                    (fallback, None)
                }
                (BridgeMode::Direct, true) => {
                    let direct: Arc<dyn ListBridge> = Arc::new(DirectBridge::new(store.clone()));
                    (direct, None)
                }
                (BridgeMode::Channel, true) => {
                    let target: Arc<dyn ListBridge> = Arc::new(DirectBridge::new(store.clone()));
                    let (bridge, host) = spawn_host(target, config.channel_capacity);
                    let channel: Arc<dyn ListBridge> = Arc::new(bridge);
                    (channel, Some(host))
                }
                (BridgeMode::LocalStorage, true) => {
                    let storage = FileStorage::open(config.data_dir.join(LOCAL_STORAGE_FILE));
                    let local: Arc<dyn ListBridge> = Arc::new(LocalStorageBridge::new(storage));
                    (local, None)
                }
            };

        log::info!(
            "Started with {} bridge, lists in {:?}, catalog {}",
            bridge.name(),
            config.data_dir,
            catalog.name()
        );

        Ok(Self {
            bridge,
            catalog,
            host: Mutex::new(host),
        })
    }

    pub fn bridge(&self) -> &dyn ListBridge {
        self.bridge.as_ref()
    }

    pub fn catalog(&self) -> &dyn CatalogProvider {
        self.catalog.as_ref()
    }

    /// Stops the bridge host, if one was started. Safe to call twice.
    pub async fn shutdown(&self) {
        let host = self.host.lock().take();
        if let Some(host) = host {
            host.shutdown().await;
        }
        log::info!("Application context shut down");
    }
}
