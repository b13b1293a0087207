use super::models::{CatalogKind, CatalogPage, CatalogRecord};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Unique identifier (e.g., "jikan")
    fn id(&self) -> &str;

    /// User-friendly name
    fn name(&self) -> &str;

    /// Text search within one catalog section.
    async fn search(&self, kind: CatalogKind, query: &str, page: u32) -> Result<CatalogPage>;

    /// Ranked listing for one catalog section.
    async fn top(&self, kind: CatalogKind, page: u32) -> Result<CatalogPage>;

    /// Full record by external catalog ID.
    async fn get(&self, kind: CatalogKind, mal_id: u64) -> Result<CatalogRecord>;

    async fn search_anime(&self, query: &str, page: u32) -> Result<CatalogPage> {
        self.search(CatalogKind::Anime, query, page).await
    }

    async fn search_manga(&self, query: &str, page: u32) -> Result<CatalogPage> {
        self.search(CatalogKind::Manga, query, page).await
    }

    async fn search_characters(&self, query: &str, page: u32) -> Result<CatalogPage> {
        self.search(CatalogKind::Characters, query, page).await
    }

    async fn top_anime(&self, page: u32) -> Result<CatalogPage> {
        self.top(CatalogKind::Anime, page).await
    }

    async fn top_manga(&self, page: u32) -> Result<CatalogPage> {
        self.top(CatalogKind::Manga, page).await
    }

    async fn get_anime(&self, mal_id: u64) -> Result<CatalogRecord> {
        self.get(CatalogKind::Anime, mal_id).await
    }

    async fn get_manga(&self, mal_id: u64) -> Result<CatalogRecord> {
        self.get(CatalogKind::Manga, mal_id).await
    }

    async fn get_character(&self, mal_id: u64) -> Result<CatalogRecord> {
        self.get(CatalogKind::Characters, mal_id).await
    }
}
