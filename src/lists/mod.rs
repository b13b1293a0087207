pub mod models;
pub mod ops;
pub mod store;

pub use models::{
    FavoriteEntry, ListEntry, ListKind, Patchable, ReadStatus, ReadingListEntry, ReadingListPatch,
    WatchStatus, WatchlistEntry, WatchlistPatch,
};
pub use store::ListStore;
