use crate::bridge::ipc::{execute, BridgeOp};
use crate::catalog::CatalogRecord;
use crate::context::AppContext;
use crate::lists::{
    ops, FavoriteEntry, ListKind, ReadingListEntry, WatchlistEntry, WatchlistPatch,
};
use serde_json::Value;
use tauri::{command, State};

#[command]
pub async fn get_watchlist(ctx: State<'_, AppContext>) -> Result<Vec<WatchlistEntry>, String> {
    ctx.bridge().get_watchlist().await.map_err(|e| e.to_string())
}

#[command]
pub async fn add_to_watchlist(
    ctx: State<'_, AppContext>,
    record: CatalogRecord,
) -> Result<Vec<WatchlistEntry>, String> {
    ctx.bridge()
        .add_to_watchlist(record)
        .await
        .map_err(|e| e.to_string())
}

#[command]
pub async fn remove_from_watchlist(
    ctx: State<'_, AppContext>,
    mal_id: u64,
) -> Result<Vec<WatchlistEntry>, String> {
    ctx.bridge()
        .remove_from_watchlist(mal_id)
        .await
        .map_err(|e| e.to_string())
}

#[command]
pub async fn update_watchlist(
    ctx: State<'_, AppContext>,
    mal_id: u64,
    updates: WatchlistPatch,
) -> Result<Vec<WatchlistEntry>, String> {
    ctx.bridge()
        .update_watchlist(mal_id, updates)
        .await
        .map_err(|e| e.to_string())
}

#[command]
pub async fn get_readinglist(ctx: State<'_, AppContext>) -> Result<Vec<ReadingListEntry>, String> {
    ctx.bridge().get_readinglist().await.map_err(|e| e.to_string())
}

#[command]
pub async fn add_to_readinglist(
    ctx: State<'_, AppContext>,
    record: CatalogRecord,
) -> Result<Vec<ReadingListEntry>, String> {
    ctx.bridge()
        .add_to_readinglist(record)
        .await
        .map_err(|e| e.to_string())
}

#[command]
pub async fn remove_from_readinglist(
    ctx: State<'_, AppContext>,
    mal_id: u64,
) -> Result<Vec<ReadingListEntry>, String> {
    ctx.bridge()
        .remove_from_readinglist(mal_id)
        .await
        .map_err(|e| e.to_string())
}

#[command]
pub async fn get_favorites(ctx: State<'_, AppContext>) -> Result<Vec<FavoriteEntry>, String> {
    ctx.bridge().get_favorites().await.map_err(|e| e.to_string())
}

#[command]
pub async fn add_to_favorites(
    ctx: State<'_, AppContext>,
    record: CatalogRecord,
) -> Result<Vec<FavoriteEntry>, String> {
    ctx.bridge()
        .add_to_favorites(record)
        .await
        .map_err(|e| e.to_string())
}

#[command]
pub async fn remove_from_favorites(
    ctx: State<'_, AppContext>,
    mal_id: u64,
) -> Result<Vec<FavoriteEntry>, String> {
    ctx.bridge()
        .remove_from_favorites(mal_id)
        .await
        .map_err(|e| e.to_string())
}

/// "In list" badge check for catalog cards.
#[command]
pub async fn is_in_list(
    ctx: State<'_, AppContext>,
    kind: String,
    mal_id: u64,
) -> Result<bool, String> {
    let bridge = ctx.bridge();
    let found = match kind.parse::<ListKind>()? {
        ListKind::Watchlist => bridge.get_watchlist().await.map(|l| ops::contains(&l, mal_id)),
        ListKind::ReadingList => bridge
            .get_readinglist()
            .await
            .map(|l| ops::contains(&l, mal_id)),
        ListKind::Favorites => bridge.get_favorites().await.map(|l| ops::contains(&l, mal_id)),
    };
    found.map_err(|e| e.to_string())
}

/// Runs any bridge operation by its hyphenated name, e.g. `add-to-watchlist`.
#[command]
pub async fn invoke_list_op(
    ctx: State<'_, AppContext>,
    op: String,
    args: Option<Value>,
) -> Result<Value, String> {
    let op = op.parse::<BridgeOp>().map_err(|e| e.to_string())?;
    execute(ctx.bridge(), op, &args.unwrap_or(Value::Null))
        .await
        .map_err(|e| e.to_string())
}
