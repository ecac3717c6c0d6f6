use async_trait::async_trait;
use catalog_model::{
    domain::{ItemKey, MediaKind},
    error::ProviderError,
    protocol::{ExternalIds, PagedResults, RawDetails, RawEntry, VideoList},
};
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{map_reqwest_error, CatalogProvider, TrendingScope};
use crate::config::ProviderSettings;

/// HTTP client for the primary catalog provider.
#[derive(Clone)]
pub struct TmdbClient {
    http: Client,
    api_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(http: Client, settings: &ProviderSettings) -> Self {
        Self {
            http,
            api_url: settings.tmdb_api_url.trim_end_matches('/').to_string(),
            api_key: settings.tmdb_api_key.clone(),
            language: settings.discovery_language.clone(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        tracing::debug!(endpoint = path, "primary provider request");
        self.http
            .get(format!("{}{path}", self.api_url))
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|err| map_reqwest_error(path, err))?
            .error_for_status()
            .map_err(|err| map_reqwest_error(path, err))?
            .json()
            .await
            .map_err(|err| map_reqwest_error(path, err))
    }
}

#[async_trait]
impl CatalogProvider for TmdbClient {
    async fn discover(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<PagedResults<RawEntry>, ProviderError> {
        let path = format!("/discover/{}", kind.provider_segment());
        self.get_json(
            &path,
            &[
                ("page", page.to_string()),
                ("sort_by", "popularity.desc".to_string()),
                ("with_original_language", self.language.clone()),
            ],
        )
        .await
    }

    async fn search_multi(
        &self,
        query: &str,
        page: u32,
    ) -> Result<PagedResults<RawEntry>, ProviderError> {
        self.get_json(
            "/search/multi",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    async fn trending_week(
        &self,
        scope: TrendingScope,
    ) -> Result<PagedResults<RawEntry>, ProviderError> {
        let path = format!("/trending/{}/week", scope.segment());
        self.get_json(&path, &[("page", "1".to_string())]).await
    }

    async fn details(&self, key: ItemKey) -> Result<RawDetails, ProviderError> {
        let path = format!("/{}/{}", key.media_kind.provider_segment(), key.id);
        self.get_json(&path, &[]).await
    }

    async fn videos(&self, key: ItemKey) -> Result<VideoList, ProviderError> {
        let path = format!("/{}/{}/videos", key.media_kind.provider_segment(), key.id);
        self.get_json(&path, &[]).await
    }

    async fn external_ids(&self, key: ItemKey) -> Result<ExternalIds, ProviderError> {
        let path = format!(
            "/{}/{}/external_ids",
            key.media_kind.provider_segment(),
            key.id
        );
        self.get_json(&path, &[]).await
    }
}

#[cfg(test)]
#[path = "../tests/tmdb_tests.rs"]
mod tests;
