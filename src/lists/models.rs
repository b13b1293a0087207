use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::CatalogRecord;

pub const MAX_RATING: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Watchlist,
    #[serde(rename = "readinglist")]
    ReadingList,
    Favorites,
}

impl ListKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ListKind::Watchlist => "watchlist.json",
            ListKind::ReadingList => "readinglist.json",
            ListKind::Favorites => "favorites.json",
        }
    }

    /// Key under which the local-storage fallback keeps this list.
    pub fn storage_key(&self) -> &'static str {
        match self {
            ListKind::Watchlist => "watchlist",
            ListKind::ReadingList => "readinglist",
            ListKind::Favorites => "favorites",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

impl FromStr for ListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "watchlist" => Ok(ListKind::Watchlist),
            "readinglist" => Ok(ListKind::ReadingList),
            "favorites" | "favourites" => Ok(ListKind::Favorites),
            _ => Err(format!("Invalid list kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    #[default]
    Planning,
    Watching,
    Completed,
    Dropped,
}

impl FromStr for WatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planning" => Ok(WatchStatus::Planning),
            "watching" => Ok(WatchStatus::Watching),
            "completed" => Ok(WatchStatus::Completed),
            "dropped" => Ok(WatchStatus::Dropped),
            _ => Err(format!("Invalid watch status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadStatus {
    #[default]
    Planning,
    Reading,
    Completed,
    Dropped,
}

impl FromStr for ReadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planning" => Ok(ReadStatus::Planning),
            "reading" => Ok(ReadStatus::Reading),
            "completed" => Ok(ReadStatus::Completed),
            "dropped" => Ok(ReadStatus::Dropped),
            _ => Err(format!("Invalid read status: {}", s)),
        }
    }
}

/// A persisted list entry, keyed by its external catalog ID.
pub trait ListEntry: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: ListKind;

    fn mal_id(&self) -> u64;

    /// Projects a raw provider record into this entry shape.
    fn from_record(record: &CatalogRecord, added_at: DateTime<Utc>) -> Self;
}

/// Entries that support partial updates. Favorites deliberately do not.
pub trait Patchable: ListEntry {
    type Patch: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    fn apply_patch(&mut self, patch: &Self::Patch);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub mal_id: u64,
    pub title: String,
    pub image_url: Option<String>,
    pub episodes: u32,
    pub score: f64,
    pub episodes_watched: u32,
    pub status: WatchStatus,
    pub rating: u8,
    pub notes: String,
    pub added_at: DateTime<Utc>,
}

impl ListEntry for WatchlistEntry {
    const KIND: ListKind = ListKind::Watchlist;

    fn mal_id(&self) -> u64 {
        self.mal_id
    }

    fn from_record(record: &CatalogRecord, added_at: DateTime<Utc>) -> Self {
        Self {
            mal_id: record.mal_id,
            title: record.display_title(),
            image_url: record.best_image_url(),
            episodes: record.episodes.unwrap_or(0),
            score: record.score.unwrap_or(0.0),
            episodes_watched: 0,
            status: record
                .status
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            rating: 0,
            notes: String::new(),
            added_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchlistPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes_watched: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WatchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Patchable for WatchlistEntry {
    type Patch = WatchlistPatch;

    fn apply_patch(&mut self, patch: &WatchlistPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url = Some(image_url.clone());
        }
        if let Some(episodes) = patch.episodes {
            self.episodes = episodes;
        }
        if let Some(score) = patch.score {
            self.score = score;
        }
        if let Some(watched) = patch.episodes_watched {
            self.episodes_watched = watched;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating.min(MAX_RATING);
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingListEntry {
    pub mal_id: u64,
    pub title: String,
    pub image_url: Option<String>,
    pub chapters: u32,
    pub score: f64,
    pub chapters_read: u32,
    pub status: ReadStatus,
    pub rating: u8,
    pub notes: String,
    pub added_at: DateTime<Utc>,
}

impl ListEntry for ReadingListEntry {
    const KIND: ListKind = ListKind::ReadingList;

    fn mal_id(&self) -> u64 {
        self.mal_id
    }

    fn from_record(record: &CatalogRecord, added_at: DateTime<Utc>) -> Self {
        Self {
            mal_id: record.mal_id,
            title: record.display_title(),
            image_url: record.best_image_url(),
            chapters: record.chapters.unwrap_or(0),
            score: record.score.unwrap_or(0.0),
            chapters_read: 0,
            status: record
                .status
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            rating: 0,
            notes: String::new(),
            added_at,
        }
    }
}

/// Reading-list updates only touch progress and personal fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingListPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters_read: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Patchable for ReadingListEntry {
    type Patch = ReadingListPatch;

    fn apply_patch(&mut self, patch: &ReadingListPatch) {
        if let Some(read) = patch.chapters_read {
            self.chapters_read = read;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating.min(MAX_RATING);
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub mal_id: u64,
    pub name: String,
    pub image_url: Option<String>,
    /// Title of the anime or manga the character is from.
    pub work_title: String,
    pub favorites: u32,
    pub added_at: DateTime<Utc>,
}

impl ListEntry for FavoriteEntry {
    const KIND: ListKind = ListKind::Favorites;

    fn mal_id(&self) -> u64 {
        self.mal_id
    }

    fn from_record(record: &CatalogRecord, added_at: DateTime<Utc>) -> Self {
        Self {
            mal_id: record.mal_id,
            name: record.display_name(),
            image_url: record.best_image_url(),
            work_title: record.first_work_title().unwrap_or_default(),
            favorites: record.favorites.unwrap_or(0),
            added_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_watchlist_projection_defaults() {
        let entry = WatchlistEntry::from_record(&CatalogRecord::new(5114, "X"), now());

        assert_eq!(entry.mal_id, 5114);
        assert_eq!(entry.title, "X");
        assert_eq!(entry.image_url, None);
        assert_eq!(entry.episodes, 0);
        assert_eq!(entry.score, 0.0);
        assert_eq!(entry.episodes_watched, 0);
        assert_eq!(entry.status, WatchStatus::Planning);
        assert_eq!(entry.rating, 0);
        assert!(entry.notes.is_empty());
    }

    #[test]
    fn test_provider_status_does_not_leak_into_tracking_status() {
        let mut record = CatalogRecord::new(1, "Airing Show");
        record.status = Some("Currently Airing".to_string());

        let entry = WatchlistEntry::from_record(&record, now());
        assert_eq!(entry.status, WatchStatus::Planning);

        record.status = Some("Watching".to_string());
        let entry = WatchlistEntry::from_record(&record, now());
        assert_eq!(entry.status, WatchStatus::Watching);
    }

    #[test]
    fn test_reading_projection_uses_chapters() {
        let mut record = CatalogRecord::new(2, "Berserk");
        record.chapters = Some(380);
        record.score = Some(9.47);
        record.status = Some("reading".to_string());

        let entry = ReadingListEntry::from_record(&record, now());

        assert_eq!(entry.chapters, 380);
        assert_eq!(entry.score, 9.47);
        assert_eq!(entry.chapters_read, 0);
        assert_eq!(entry.status, ReadStatus::Reading);
    }

    #[test]
    fn test_favorite_projection_from_character() {
        let raw = r#"{
            "mal_id": 11,
            "name": "Edward Elric",
            "images": { "jpg": { "image_url": "https://cdn/11.jpg" } },
            "favorites": 90000,
            "anime": [{ "role": "Main", "anime": { "mal_id": 5114, "title": "FMA:B" } }]
        }"#;
        let record: CatalogRecord = serde_json::from_str(raw).unwrap();

        let entry = FavoriteEntry::from_record(&record, now());

        assert_eq!(entry.name, "Edward Elric");
        assert_eq!(entry.work_title, "FMA:B");
        assert_eq!(entry.favorites, 90000);
        assert_eq!(entry.image_url.as_deref(), Some("https://cdn/11.jpg"));
    }

    #[test]
    fn test_watchlist_patch_touches_only_supplied_fields() {
        let mut entry = WatchlistEntry::from_record(&CatalogRecord::new(1, "A"), now());
        let before = entry.clone();

        entry.apply_patch(&WatchlistPatch {
            episodes_watched: Some(12),
            notes: Some("great op".to_string()),
            ..Default::default()
        });

        assert_eq!(entry.episodes_watched, 12);
        assert_eq!(entry.notes, "great op");
        assert_eq!(entry.title, before.title);
        assert_eq!(entry.status, before.status);
        assert_eq!(entry.rating, before.rating);
        assert_eq!(entry.added_at, before.added_at);
    }

    #[test]
    fn test_rating_is_clamped() {
        let mut entry = ReadingListEntry::from_record(&CatalogRecord::new(1, "A"), now());
        entry.apply_patch(&ReadingListPatch {
            rating: Some(42),
            ..Default::default()
        });
        assert_eq!(entry.rating, MAX_RATING);
    }

    #[test]
    fn test_reading_patch_ignores_fields_it_does_not_carry() {
        let patch: ReadingListPatch =
            serde_json::from_str(r#"{ "title": "Renamed", "chapters_read": 5 }"#).unwrap();
        let mut entry = ReadingListEntry::from_record(&CatalogRecord::new(1, "A"), now());

        entry.apply_patch(&patch);

        assert_eq!(entry.title, "A");
        assert_eq!(entry.chapters_read, 5);
    }

    #[test]
    fn test_serialized_shape_is_snake_case() {
        let entry = WatchlistEntry::from_record(&CatalogRecord::new(5114, "X"), now());
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["mal_id"], 5114);
        assert_eq!(json["status"], "planning");
        assert_eq!(json["episodes_watched"], 0);
        assert!(json["added_at"].is_string());
    }

    #[test]
    fn test_list_kind_from_str() {
        assert_eq!("reading-list".parse::<ListKind>(), Ok(ListKind::ReadingList));
        assert_eq!("Watchlist".parse::<ListKind>(), Ok(ListKind::Watchlist));
        assert!("history".parse::<ListKind>().is_err());
        assert_eq!(ListKind::ReadingList.file_name(), "readinglist.json");
    }
}
