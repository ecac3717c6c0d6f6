//! Normalization of primary-provider entries into [`CatalogItem`]s.

use catalog_model::{
    domain::{CatalogItem, ItemId, MediaKind, NO_SYNOPSIS},
    protocol::RawEntry,
};

use crate::config::ProviderSettings;

pub const POSTER_PLACEHOLDER_URL: &str =
    "https://placehold.co/300x450/4B5563/FFFFFF?text=Image+Unavailable";
pub const BACKDROP_PLACEHOLDER_URL: &str =
    "https://placehold.co/1280x720/1F2937/FFFFFF?text=Image+Unavailable";
const UNTITLED: &str = "Untitled";

/// Image base URLs for the two aspect ratios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBases {
    pub poster: String,
    pub backdrop: String,
}

impl ImageBases {
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self {
            poster: settings.poster_base_url.clone(),
            backdrop: settings.backdrop_base_url.clone(),
        }
    }
}

impl Default for ImageBases {
    fn default() -> Self {
        Self::from_settings(&ProviderSettings::default())
    }
}

pub fn normalize(entry: &RawEntry, context_kind: MediaKind, images: &ImageBases) -> CatalogItem {
    let title = non_blank(entry.title.as_deref())
        .or_else(|| non_blank(entry.name.as_deref()))
        .unwrap_or(UNTITLED)
        .to_string();
    let description = non_blank(entry.overview.as_deref())
        .unwrap_or(NO_SYNOPSIS)
        .to_string();
    let media_kind = entry
        .media_type
        .as_deref()
        .map(MediaKind::from_provider_tag)
        .unwrap_or(context_kind);
    let release_date = non_blank(entry.release_date.as_deref())
        .or_else(|| non_blank(entry.first_air_date.as_deref()))
        .map(str::to_string);

    CatalogItem {
        id: ItemId(entry.id),
        title,
        description,
        media_kind,
        poster_url: image_url(
            &images.poster,
            entry.poster_path.as_deref(),
            POSTER_PLACEHOLDER_URL,
        ),
        backdrop_url: image_url(
            &images.backdrop,
            entry.backdrop_path.as_deref(),
            BACKDROP_PLACEHOLDER_URL,
        ),
        rating: entry.vote_average,
        release_date,
    }
}

/// Entries the result lists never show: people, and anything without a poster.
pub fn is_listable(entry: &RawEntry) -> bool {
    !entry.is_person() && entry.has_poster()
}

/// Applies the listing filter, then normalizes what is left in provider order.
pub fn normalize_listing(
    entries: &[RawEntry],
    context_kind: MediaKind,
    images: &ImageBases,
) -> Vec<CatalogItem> {
    entries
        .iter()
        .filter(|entry| is_listable(entry))
        .map(|entry| normalize(entry, context_kind, images))
        .collect()
}

fn image_url(base: &str, path: Option<&str>, placeholder: &str) -> String {
    match non_blank(path) {
        Some(path) => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ),
        None => placeholder.to_string(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "tests/adapter_tests.rs"]
mod tests;
