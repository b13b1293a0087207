use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which catalog section a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Anime,
    Manga,
    Characters,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Anime => "anime",
            CatalogKind::Manga => "manga",
            CatalogKind::Characters => "characters",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anime" => Ok(CatalogKind::Anime),
            "manga" => Ok(CatalogKind::Manga),
            "character" | "characters" => Ok(CatalogKind::Characters),
            _ => Err(format!("Invalid catalog kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Images {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jpg: Option<ImageSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webp: Option<ImageSet>,
}

/// A minimal reference to an anime or manga, as nested inside character records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mal_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeAppearance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub anime: WorkRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MangaAppearance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub manga: WorkRef,
}

/// A raw record from the metadata provider.
///
/// Only `mal_id` is required. Everything else may be missing or null, and
/// unknown fields are ignored. Projection into list entries happens in
/// `lists::models`, where every default is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub mal_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Images>,
    /// Flat image URL, used when a caller has already picked one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorites: Option<u32>,
    /// Provider status ("Finished Airing") or a tracking status ("watching").
    /// Only tracking statuses survive projection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anime: Option<Vec<AnimeAppearance>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manga: Option<Vec<MangaAppearance>>,
}

impl CatalogRecord {
    /// Bare record with just an id and a title.
    pub fn new(mal_id: u64, title: impl Into<String>) -> Self {
        Self {
            mal_id,
            url: None,
            title: Some(title.into()),
            name: None,
            images: None,
            image_url: None,
            media_type: None,
            synopsis: None,
            episodes: None,
            chapters: None,
            score: None,
            favorites: None,
            status: None,
            anime: None,
            manga: None,
        }
    }

    /// `title`, falling back to `name`.
    pub fn display_title(&self) -> String {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
            .to_string()
    }

    /// `name`, falling back to `title`.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or_default()
            .to_string()
    }

    pub fn best_image_url(&self) -> Option<String> {
        if let Some(url) = self.image_url.as_ref().filter(|u| !u.is_empty()) {
            return Some(url.clone());
        }
        let images = self.images.as_ref()?;
        [images.jpg.as_ref(), images.webp.as_ref()]
            .into_iter()
            .flatten()
            .find_map(|set| {
                set.image_url
                    .clone()
                    .or_else(|| set.large_image_url.clone())
                    .filter(|u| !u.is_empty())
            })
    }

    /// Title of the first anime (then manga) a character appears in.
    pub fn first_work_title(&self) -> Option<String> {
        let from_anime = self
            .anime
            .as_ref()
            .and_then(|roles| roles.iter().find_map(|r| r.anime.title.clone()));
        from_anime.or_else(|| {
            self.manga
                .as_ref()
                .and_then(|roles| roles.iter().find_map(|r| r.manga.title.clone()))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginationItems {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub per_page: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub last_visible_page: u32,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<PaginationItems>,
}

/// `{ data: [...], pagination?: {...} }` envelope of list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub data: Vec<CatalogRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl CatalogPage {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            pagination: None,
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.pagination
            .as_ref()
            .map(|p| p.has_next_page)
            .unwrap_or(false)
    }
}

/// `{ data: {...} }` envelope of single-record endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SingleEnvelope<T> {
    pub data: T,
}
