use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::AppError;

pub const APP_DIR_NAME: &str = "animark";
pub const DEFAULT_API_BASE_URL: &str = "https://api.jikan.moe/v4";
pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_PAGE_LIMIT: u32 = 25;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

pub const DATA_DIR_ENV: &str = "ANIMARK_DATA_DIR";
pub const API_BASE_URL_ENV: &str = "ANIMARK_API_BASE_URL";

pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn get_config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join("config.json")
}

/// Which bridge implementation the context wires up at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeMode {
    /// Calls go straight to the list store.
    Direct,
    /// Calls are serialized into envelopes and served by a host task.
    Channel,
    /// No host available; lists live in the key/value storage file.
    LocalStorage,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub page_limit: u32,
    pub bridge_mode: BridgeMode,
    pub channel_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: get_data_dir(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECONDS,
            page_limit: DEFAULT_PAGE_LIMIT,
            bridge_mode: BridgeMode::Direct,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Reads the config file at `path`.
    ///
    /// A missing file yields the defaults. An unreadable or malformed file is
    /// logged and also yields the defaults, so a bad config never blocks startup.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Malformed config at {:?}: {}. Using defaults", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config at {:?}: {}. Using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Loads from the default location, then applies environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::load(&get_config_file_path());
        config.apply_env_overrides();
        config
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url;
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.api_base_url.trim().is_empty() {
            return Err(AppError::Config("api_base_url must not be empty".to_string()));
        }
        if self.page_limit == 0 {
            return Err(AppError::Config("page_limit must be at least 1".to_string()));
        }
        if self.channel_capacity == 0 {
            return Err(AppError::Config(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
