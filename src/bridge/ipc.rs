use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ListBridge;
use crate::catalog::CatalogRecord;
use crate::errors::AppError;
use crate::lists::WatchlistPatch;

/// The named operations exposed to the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeOp {
    GetWatchlist,
    AddToWatchlist,
    RemoveFromWatchlist,
    UpdateWatchlist,
    GetReadinglist,
    AddToReadinglist,
    RemoveFromReadinglist,
    GetFavorites,
    AddToFavorites,
    RemoveFromFavorites,
}

impl BridgeOp {
    pub const ALL: [BridgeOp; 10] = [
        BridgeOp::GetWatchlist,
        BridgeOp::AddToWatchlist,
        BridgeOp::RemoveFromWatchlist,
        BridgeOp::UpdateWatchlist,
        BridgeOp::GetReadinglist,
        BridgeOp::AddToReadinglist,
        BridgeOp::RemoveFromReadinglist,
        BridgeOp::GetFavorites,
        BridgeOp::AddToFavorites,
        BridgeOp::RemoveFromFavorites,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeOp::GetWatchlist => "get-watchlist",
            BridgeOp::AddToWatchlist => "add-to-watchlist",
            BridgeOp::RemoveFromWatchlist => "remove-from-watchlist",
            BridgeOp::UpdateWatchlist => "update-watchlist",
            BridgeOp::GetReadinglist => "get-readinglist",
            BridgeOp::AddToReadinglist => "add-to-readinglist",
            BridgeOp::RemoveFromReadinglist => "remove-from-readinglist",
            BridgeOp::GetFavorites => "get-favorites",
            BridgeOp::AddToFavorites => "add-to-favorites",
            BridgeOp::RemoveFromFavorites => "remove-from-favorites",
        }
    }
}

impl fmt::Display for BridgeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BridgeOp {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the snake_case spelling used by desktop command names too.
        let normalized = s.trim().replace('_', "-");
        BridgeOp::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| AppError::InvalidOperation(format!("Unknown operation: {}", s)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddArgs {
    pub record: CatalogRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveArgs {
    pub mal_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateArgs {
    pub mal_id: u64,
    #[serde(default)]
    pub updates: WatchlistPatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub id: String,
    pub op: String,
    #[serde(default)]
    pub args: Value,
}

impl BridgeRequest {
    pub fn new(op: BridgeOp, args: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            op: op.as_str().to_string(),
            args,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub id: String,
    pub result: Result<Value, AppError>,
}

fn parse_args<T: DeserializeOwned>(op: BridgeOp, args: &Value) -> Result<T, AppError> {
    serde_json::from_value(args.clone())
        .map_err(|e| AppError::InvalidOperation(format!("Bad arguments for {}: {}", op, e)))
}

fn to_value<T: Serialize>(entries: T) -> Result<Value, AppError> {
    Ok(serde_json::to_value(entries)?)
}

/// Runs one named operation against `target` and returns its JSON result.
pub async fn execute(target: &dyn ListBridge, op: BridgeOp, args: &Value) -> Result<Value, AppError> {
    match op {
        BridgeOp::GetWatchlist => to_value(target.get_watchlist().await?),
        BridgeOp::AddToWatchlist => {
            let AddArgs { record } = parse_args(op, args)?;
            to_value(target.add_to_watchlist(record).await?)
        }
        BridgeOp::RemoveFromWatchlist => {
            let RemoveArgs { mal_id } = parse_args(op, args)?;
            to_value(target.remove_from_watchlist(mal_id).await?)
        }
        BridgeOp::UpdateWatchlist => {
            let UpdateArgs { mal_id, updates } = parse_args(op, args)?;
            to_value(target.update_watchlist(mal_id, updates).await?)
        }
        BridgeOp::GetReadinglist => to_value(target.get_readinglist().await?),
        BridgeOp::AddToReadinglist => {
            let AddArgs { record } = parse_args(op, args)?;
            to_value(target.add_to_readinglist(record).await?)
        }
        BridgeOp::RemoveFromReadinglist => {
            let RemoveArgs { mal_id } = parse_args(op, args)?;
            to_value(target.remove_from_readinglist(mal_id).await?)
        }
        BridgeOp::GetFavorites => to_value(target.get_favorites().await?),
        BridgeOp::AddToFavorites => {
            let AddArgs { record } = parse_args(op, args)?;
            to_value(target.add_to_favorites(record).await?)
        }
        BridgeOp::RemoveFromFavorites => {
            let RemoveArgs { mal_id } = parse_args(op, args)?;
            to_value(target.remove_from_favorites(mal_id).await?)
        }
    }
}

/// Serves one request envelope. Failures travel back inside the response.
pub async fn dispatch(target: &dyn ListBridge, request: &BridgeRequest) -> BridgeResponse {
    let result = match request.op.parse::<BridgeOp>() {
        Ok(op) => execute(target, op, &request.args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        log::warn!("Bridge request {} ({}) failed: {}", request.id, request.op, e);
    }

    BridgeResponse {
        id: request.id.clone(),
        result,
    }
}
