use chrono::Utc;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::models::{ListEntry, ListKind, Patchable};
use super::ops;
use crate::catalog::CatalogRecord;
use crate::errors::AppError;

/// One pretty-printed JSON array per list kind under `data_dir`.
///
/// Every mutation is read, mutate, rewrite. There is no lock around that
/// sequence, so two overlapping mutations of the same list can lose one
/// of the writes.
pub struct ListStore {
    data_dir: PathBuf,
}

impl ListStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, kind: ListKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    pub async fn ensure_data_dir(&self) -> Result<(), AppError> {
        if !self.data_dir.is_dir() {
            tokio::fs::create_dir_all(&self.data_dir).await?;
            log::info!("Created list directory at {:?}", self.data_dir);
        }
        Ok(())
    }

    /// Current contents of a list. Never fails.
    ///
    /// A missing file is created empty and a corrupt one is reset to `[]`.
    /// Any other read error is logged and reported as an empty list.
    pub async fn get<E: ListEntry>(&self) -> Vec<E> {
        match self.load::<E>().await {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to read {}: {}. Returning empty list", E::KIND, e);
                Vec::new()
            }
        }
    }

    pub async fn contains<E: ListEntry>(&self, mal_id: u64) -> bool {
        ops::contains(&self.get::<E>().await, mal_id)
    }

    pub async fn add<E: ListEntry>(&self, record: &CatalogRecord) -> Result<Vec<E>, AppError> {
        let mut entries = self.load::<E>().await?;

        if ops::insert_unique(&mut entries, E::from_record(record, Utc::now())) {
            self.persist(&entries).await?;
            log::info!("Added {} to {}", record.mal_id, E::KIND);
        } else {
            log::debug!("{} already in {}, skipping add", record.mal_id, E::KIND);
        }

        Ok(entries)
    }

    pub async fn remove<E: ListEntry>(&self, mal_id: u64) -> Result<Vec<E>, AppError> {
        let mut entries = self.load::<E>().await?;

        if ops::remove_by_id(&mut entries, mal_id) {
            self.persist(&entries).await?;
            log::info!("Removed {} from {}", mal_id, E::KIND);
        }

        Ok(entries)
    }

    pub async fn update<E: Patchable>(
        &self,
        mal_id: u64,
        patch: &E::Patch,
    ) -> Result<Vec<E>, AppError> {
        let mut entries = self.load::<E>().await?;

        if ops::patch_by_id(&mut entries, mal_id, patch) {
            self.persist(&entries).await?;
            log::debug!("Updated {} in {}", mal_id, E::KIND);
        } else {
            log::debug!("Update for {} skipped, not in {}", mal_id, E::KIND);
        }

        Ok(entries)
    }

    /// Overwrites the backing file with `entries`.
    pub async fn persist<E: ListEntry>(&self, entries: &[E]) -> Result<(), AppError> {
        let content = serde_json::to_string_pretty(entries)?;
        self.write_raw(E::KIND, &content).await
    }

    async fn write_raw(&self, kind: ListKind, content: &str) -> Result<(), AppError> {
        self.ensure_data_dir().await?;
        tokio::fs::write(self.path_for(kind), content).await?;
        Ok(())
    }

    /// Reads a list, repairing a missing or corrupt file to `[]`.
    /// Other I/O failures are returned so mutations never overwrite a file
    /// they could not read.
    async fn load<E: ListEntry>(&self) -> Result<Vec<E>, AppError> {
        let path = self.path_for(E::KIND);

        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("{:?} does not exist, creating empty list", path);
                self.reset(E::KIND).await;
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Vec<E>>(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                log::warn!(
                    "Corrupt {} at {:?} ({}). Resetting to empty list",
                    E::KIND,
                    path,
                    e
                );
                self.reset(E::KIND).await;
                Ok(Vec::new())
            }
        }
    }

    async fn reset(&self, kind: ListKind) {
        if let Err(e) = self.write_raw(kind, "[]").await {
            log::warn!("Failed to reset {}: {}", kind, e);
        }
    }
}
