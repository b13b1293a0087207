use crate::catalog::{self, CatalogKind, CatalogPage, CatalogRecord};
use crate::context::AppContext;
use tauri::{command, State};

#[command]
pub async fn search_catalog(
    ctx: State<'_, AppContext>,
    kind: String,
    query: String,
    page: Option<u32>,
) -> Result<CatalogPage, String> {
    let kind = kind.parse::<CatalogKind>()?;
    Ok(catalog::search_or_empty(ctx.catalog(), kind, &query, page.unwrap_or(1)).await)
}

#[command]
pub async fn top_catalog(
    ctx: State<'_, AppContext>,
    kind: String,
    page: Option<u32>,
) -> Result<CatalogPage, String> {
    let kind = kind.parse::<CatalogKind>()?;
    Ok(catalog::top_or_empty(ctx.catalog(), kind, page.unwrap_or(1)).await)
}

#[command]
pub async fn get_catalog_record(
    ctx: State<'_, AppContext>,
    kind: String,
    mal_id: u64,
) -> Result<CatalogRecord, String> {
    let kind = kind.parse::<CatalogKind>()?;
    ctx.catalog().get(kind, mal_id).await.map_err(|e| {
        log::warn!("Fetching {} {} failed: {}", kind, mal_id, e);
        e.to_string()
    })
}
