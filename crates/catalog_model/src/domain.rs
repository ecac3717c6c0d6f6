use std::{collections::BTreeMap, fmt};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ItemId);

/// Sentinel shown in place of a missing synopsis.
pub const NO_SYNOPSIS: &str = "No synopsis available.";
/// Sentinel shown in place of a missing detail overview.
pub const NO_OVERVIEW: &str = "No overview available.";
/// Sentinel for a secondary rating source that has no value.
pub const RATING_NOT_AVAILABLE: &str = "N/A";

pub const IMDB_SOURCE: &str = "Internet Movie Database";
pub const ROTTEN_TOMATOES_SOURCE: &str = "Rotten Tomatoes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Series,
    Unknown,
}

impl MediaKind {
    /// Maps a provider type tag onto a kind. `person` is not a media kind and
    /// must be filtered out before this is consulted.
    pub fn from_provider_tag(tag: &str) -> Self {
        match tag {
            "movie" => Self::Movie,
            "tv" => Self::Series,
            _ => Self::Unknown,
        }
    }

    /// Path segment the primary provider uses for per-item endpoints.
    /// Unknown kinds are looked up as movies.
    pub fn provider_segment(self) -> &'static str {
        match self {
            Self::Series => "tv",
            Self::Movie | Self::Unknown => "movie",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::Series => "TV",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_segment())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Home,
    Movie,
    Tv,
    Anime,
}

impl Category {
    pub const ALL: [Category; 4] = [Self::Home, Self::Movie, Self::Tv, Self::Anime];

    /// Kind assigned to list entries that carry no type tag of their own.
    pub fn context_kind(self) -> MediaKind {
        match self {
            Self::Tv => MediaKind::Series,
            Self::Home | Self::Movie | Self::Anime => MediaKind::Movie,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Movie => "Movies",
            Self::Tv => "TV Shows",
            Self::Anime => "Anime",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Self::Home => "home",
            Self::Movie => "movie",
            Self::Tv => "tv",
            Self::Anime => "anime",
        };
        f.write_str(key)
    }
}

/// Provider ids are only unique within a kind, so items are addressed by both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub id: ItemId,
    pub media_kind: MediaKind,
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.media_kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub media_kind: MediaKind,
    pub poster_url: String,
    pub backdrop_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

impl CatalogItem {
    pub fn key(&self) -> ItemKey {
        ItemKey {
            id: self.id,
            media_kind: self.media_kind,
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        let raw = self.release_date.as_deref()?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(|date| date.year())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryDetails {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub overview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
}

impl PrimaryDetails {
    /// Primary vote average as a whole percentage, e.g. `7.84` becomes `78`.
    pub fn score_percent(&self) -> Option<u32> {
        self.vote_average
            .filter(|vote| *vote > 0.0)
            .map(|vote| (vote * 10.0).round() as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailerRef {
    pub site: String,
    pub key: String,
}

impl TrailerRef {
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub item: ItemKey,
    pub primary: PrimaryDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailer: Option<TrailerRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_ref_id: Option<String>,
    #[serde(default)]
    pub secondary_ratings: BTreeMap<String, String>,
}

impl DetailRecord {
    pub fn rating_from(&self, source: &str) -> &str {
        self.secondary_ratings
            .get(source)
            .map(String::as_str)
            .unwrap_or(RATING_NOT_AVAILABLE)
    }
}
