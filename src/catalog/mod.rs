//! Metadata provider access.
//!
//! The provider is an opaque remote source of anime, manga and character
//! records. Failures here are never fatal: the browse helpers below log and
//! hand back an empty page so the UI can show its empty/error state.

pub mod client;
pub mod models;
pub mod traits;

pub use client::JikanClient;
pub use models::{CatalogKind, CatalogPage, CatalogRecord, Pagination};
pub use traits::CatalogProvider;

pub async fn search_or_empty(
    provider: &dyn CatalogProvider,
    kind: CatalogKind,
    query: &str,
    page: u32,
) -> CatalogPage {
    match provider.search(kind, query, page).await {
        Ok(page) => page,
        Err(e) => {
            log::warn!(
                "{} search for {} '{}' failed: {}",
                provider.name(),
                kind,
                query,
                e
            );
            CatalogPage::empty()
        }
    }
}

pub async fn top_or_empty(provider: &dyn CatalogProvider, kind: CatalogKind, page: u32) -> CatalogPage {
    match provider.top(kind, page).await {
        Ok(page) => page,
        Err(e) => {
            log::warn!("{} top {} failed: {}", provider.name(), kind, e);
            CatalogPage::empty()
        }
    }
}
