//! Detail view aggregation: one mandatory primary call, two optional lookups
//! that run alongside it, and a conditional secondary ratings lookup.

use std::{collections::BTreeMap, sync::Arc};

use catalog_model::{
    domain::{CatalogItem, DetailRecord, ItemKey, PrimaryDetails, TrailerRef, NO_OVERVIEW},
    error::ProviderError,
    protocol::{RawDetails, SecondaryTitle, VideoList},
};
use futures::future::try_join3;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::providers::{CatalogProvider, RatingsProvider};

/// Video host whose trailers can be embedded.
pub const TRAILER_SITE: &str = "YouTube";
pub const TRAILER_TYPE: &str = "Trailer";

#[derive(Debug, Clone, Error)]
#[error("details for {item} unavailable: {source}")]
pub struct DetailError {
    pub item: ItemKey,
    #[source]
    pub source: ProviderError,
}

pub struct DetailAggregator {
    catalog: Arc<dyn CatalogProvider>,
    ratings: Arc<dyn RatingsProvider>,
}

impl DetailAggregator {
    pub fn new(catalog: Arc<dyn CatalogProvider>, ratings: Arc<dyn RatingsProvider>) -> Self {
        Self { catalog, ratings }
    }

    /// Fails only when the primary details call fails.
    pub async fn load_details(&self, item: &CatalogItem) -> Result<DetailRecord, DetailError> {
        let key = item.key();
        debug!(%key, "loading details");

        let optional_trailer = async {
            match self.catalog.videos(key).await {
                Ok(videos) => Ok::<_, ProviderError>(pick_trailer(&videos)),
                Err(err) => {
                    warn!(%key, error = %err, "trailer lookup failed");
                    Ok(None)
                }
            }
        };
        let optional_cross_ref = async {
            match self.catalog.external_ids(key).await {
                Ok(ids) => Ok::<_, ProviderError>(ids.cross_ref_id().map(str::to_string)),
                Err(err) => {
                    warn!(%key, error = %err, "cross-reference lookup failed");
                    Ok(None)
                }
            }
        };

        let (raw, trailer, cross_ref_id) =
            try_join3(self.catalog.details(key), optional_trailer, optional_cross_ref)
                .await
                .map_err(|source| DetailError { item: key, source })?;

        let secondary_ratings = match cross_ref_id.as_deref() {
            Some(id) => self.secondary_ratings(key, id).await,
            None => BTreeMap::new(),
        };

        info!(
            %key,
            trailer = trailer.is_some(),
            ratings = secondary_ratings.len(),
            "details loaded"
        );
        Ok(DetailRecord {
            item: key,
            primary: primary_details(raw),
            trailer,
            cross_ref_id,
            secondary_ratings,
        })
    }

    async fn secondary_ratings(
        &self,
        key: ItemKey,
        cross_ref_id: &str,
    ) -> BTreeMap<String, String> {
        match self.ratings.lookup(cross_ref_id).await {
            Ok(title) if title.is_success() => ratings_by_source(title),
            Ok(title) => {
                warn!(
                    %key,
                    cross_ref_id,
                    reason = title.error.as_deref().unwrap_or("unknown"),
                    "secondary provider has no entry"
                );
                BTreeMap::new()
            }
            Err(err) => {
                warn!(%key, cross_ref_id, error = %err, "secondary ratings lookup failed");
                BTreeMap::new()
            }
        }
    }
}

fn pick_trailer(videos: &VideoList) -> Option<TrailerRef> {
    videos
        .results
        .iter()
        .find(|video| video.site == TRAILER_SITE && video.video_type == TRAILER_TYPE)
        .map(|video| TrailerRef {
            site: video.site.clone(),
            key: video.key.clone(),
        })
}

/// First rating wins when a source repeats.
fn ratings_by_source(title: SecondaryTitle) -> BTreeMap<String, String> {
    let mut ratings = BTreeMap::new();
    for rating in title.ratings {
        ratings.entry(rating.source).or_insert(rating.value);
    }
    ratings
}

fn primary_details(raw: RawDetails) -> PrimaryDetails {
    let title = raw
        .title
        .filter(|title| !title.trim().is_empty())
        .or(raw.name)
        .unwrap_or_default();
    let overview = raw
        .overview
        .filter(|overview| !overview.trim().is_empty())
        .unwrap_or_else(|| NO_OVERVIEW.to_string());
    PrimaryDetails {
        title,
        tagline: raw.tagline.filter(|tagline| !tagline.trim().is_empty()),
        genres: raw.genres.into_iter().map(|genre| genre.name).collect(),
        runtime_minutes: raw
            .runtime
            .filter(|minutes| *minutes > 0)
            .or_else(|| raw.episode_run_time.first().copied()),
        status: raw.status,
        overview,
        release_date: raw.release_date.or(raw.first_air_date),
        vote_average: raw.vote_average,
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
