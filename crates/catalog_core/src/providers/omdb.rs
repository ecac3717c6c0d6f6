use async_trait::async_trait;
use catalog_model::{error::ProviderError, protocol::SecondaryTitle};
use reqwest::Client;

use super::{map_reqwest_error, RatingsProvider};
use crate::config::ProviderSettings;

const LOOKUP_ENDPOINT: &str = "ratings lookup";

/// HTTP client for the secondary ratings provider.
#[derive(Clone)]
pub struct OmdbClient {
    http: Client,
    api_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self::with_client(Client::new(), settings)
    }

    pub fn with_client(http: Client, settings: &ProviderSettings) -> Self {
        Self {
            http,
            api_url: settings.omdb_api_url.clone(),
            api_key: settings.omdb_api_key.clone(),
        }
    }
}

#[async_trait]
impl RatingsProvider for OmdbClient {
    async fn lookup(&self, cross_ref_id: &str) -> Result<SecondaryTitle, ProviderError> {
        tracing::debug!(cross_ref_id, "secondary provider request");
        self.http
            .get(&self.api_url)
            .query(&[("i", cross_ref_id), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|err| map_reqwest_error(LOOKUP_ENDPOINT, err))?
            .error_for_status()
            .map_err(|err| map_reqwest_error(LOOKUP_ENDPOINT, err))?
            .json()
            .await
            .map_err(|err| map_reqwest_error(LOOKUP_ENDPOINT, err))
    }
}

#[cfg(test)]
#[path = "../tests/omdb_tests.rs"]
mod tests;
