//! Seams to the two external metadata providers and their HTTP clients.

use async_trait::async_trait;
use catalog_model::{
    domain::{ItemKey, MediaKind},
    error::ProviderError,
    protocol::{ExternalIds, PagedResults, RawDetails, RawEntry, SecondaryTitle, VideoList},
};

mod omdb;
mod tmdb;

pub use omdb::OmdbClient;
pub use tmdb::TmdbClient;

/// Which weekly trending list to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendingScope {
    Movies,
    AllKinds,
}

impl TrendingScope {
    fn segment(self) -> &'static str {
        match self {
            Self::Movies => "movie",
            Self::AllKinds => "all",
        }
    }
}

/// The primary catalog provider.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Popularity-ordered discovery for one kind.
    async fn discover(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<PagedResults<RawEntry>, ProviderError>;
    async fn search_multi(
        &self,
        query: &str,
        page: u32,
    ) -> Result<PagedResults<RawEntry>, ProviderError>;
    async fn trending_week(
        &self,
        scope: TrendingScope,
    ) -> Result<PagedResults<RawEntry>, ProviderError>;
    async fn details(&self, key: ItemKey) -> Result<RawDetails, ProviderError>;
    async fn videos(&self, key: ItemKey) -> Result<VideoList, ProviderError>;
    async fn external_ids(&self, key: ItemKey) -> Result<ExternalIds, ProviderError>;
}

/// The secondary ratings provider.
#[async_trait]
pub trait RatingsProvider: Send + Sync {
    async fn lookup(&self, cross_ref_id: &str) -> Result<SecondaryTitle, ProviderError>;
}

/// Stand-in used when no secondary provider is configured; every lookup misses.
pub struct MissingRatingsProvider;

#[async_trait]
impl RatingsProvider for MissingRatingsProvider {
    async fn lookup(&self, cross_ref_id: &str) -> Result<SecondaryTitle, ProviderError> {
        Err(ProviderError::network(
            "ratings",
            format!("no ratings provider configured for {cross_ref_id}"),
        ))
    }
}

fn map_reqwest_error(endpoint: &str, err: reqwest::Error) -> ProviderError {
    if let Some(status) = err.status() {
        return ProviderError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        };
    }
    if err.is_decode() {
        ProviderError::decode(endpoint, err.to_string())
    } else {
        ProviderError::network(endpoint, err.to_string())
    }
}
