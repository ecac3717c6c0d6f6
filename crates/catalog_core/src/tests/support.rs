//! In-memory providers with scripted responses and optional per-request gates.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use catalog_model::{
    domain::{ItemKey, MediaKind},
    error::ProviderError,
    protocol::{
        ExternalIds, PagedResults, RawDetails, RawEntry, SecondaryRating, SecondaryTitle,
        VideoList,
    },
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::providers::{CatalogProvider, RatingsProvider, TrendingScope};

pub fn listed(id: i64, title: &str) -> RawEntry {
    RawEntry {
        id,
        title: Some(title.to_string()),
        poster_path: Some(format!("/{id}.jpg")),
        ..RawEntry::default()
    }
}

pub fn page_of(entries: &[RawEntry]) -> Value {
    json!({ "page": 1, "total_pages": 10, "results": entries })
}

pub fn titles(items: &[catalog_model::domain::CatalogItem]) -> Vec<String> {
    items.iter().map(|item| item.title.clone()).collect()
}

type Scripted = Result<Value, ProviderError>;

#[derive(Default)]
pub struct FakeCatalog {
    responses: Mutex<HashMap<String, Scripted>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, key: &str, body: Value) {
        self.responses
            .lock()
            .expect("responses")
            .insert(key.to_string(), Ok(body));
    }

    pub fn respond_page(&self, key: &str, entries: &[RawEntry]) {
        self.respond(key, page_of(entries));
    }

    pub fn fail(&self, key: &str) {
        self.responses.lock().expect("responses").insert(
            key.to_string(),
            Err(ProviderError::network(key, "connection reset")),
        );
    }

    /// The next request for `key` waits until the returned sender fires.
    pub fn gate(&self, key: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .expect("gates")
            .insert(key.to_string(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(prefix))
            .collect()
    }

    /// Yields until a request for `key` has been issued.
    pub async fn wait_for_call(&self, key: &str) {
        for _ in 0..1_000 {
            if self.calls().iter().any(|call| call == key) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("request {key} was never issued");
    }

    async fn answer<T: DeserializeOwned>(&self, key: String) -> Result<T, ProviderError> {
        self.calls.lock().expect("calls").push(key.clone());
        let gate = self.gates.lock().expect("gates").remove(&key);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let scripted = self.responses.lock().expect("responses").get(&key).cloned();
        match scripted {
            Some(Ok(body)) => serde_json::from_value(body)
                .map_err(|err| ProviderError::decode(key.as_str(), err.to_string())),
            Some(Err(err)) => Err(err),
            None => Err(ProviderError::Status {
                endpoint: key,
                status: 404,
            }),
        }
    }
}

#[async_trait]
impl CatalogProvider for FakeCatalog {
    async fn discover(
        &self,
        kind: MediaKind,
        page: u32,
    ) -> Result<PagedResults<RawEntry>, ProviderError> {
        self.answer(format!("discover/{}/{page}", kind.provider_segment()))
            .await
    }

    async fn search_multi(
        &self,
        query: &str,
        page: u32,
    ) -> Result<PagedResults<RawEntry>, ProviderError> {
        self.answer(format!("search/{query}/{page}")).await
    }

    async fn trending_week(
        &self,
        scope: TrendingScope,
    ) -> Result<PagedResults<RawEntry>, ProviderError> {
        let segment = match scope {
            TrendingScope::Movies => "movie",
            TrendingScope::AllKinds => "all",
        };
        self.answer(format!("trending/{segment}")).await
    }

    async fn details(&self, key: ItemKey) -> Result<RawDetails, ProviderError> {
        self.answer(format!("details/{key}")).await
    }

    async fn videos(&self, key: ItemKey) -> Result<VideoList, ProviderError> {
        self.answer(format!("videos/{key}")).await
    }

    async fn external_ids(&self, key: ItemKey) -> Result<ExternalIds, ProviderError> {
        self.answer(format!("external_ids/{key}")).await
    }
}

#[derive(Default)]
pub struct FakeRatings {
    titles: Mutex<HashMap<String, Result<SecondaryTitle, ProviderError>>>,
    lookups: Mutex<Vec<String>>,
}

impl FakeRatings {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, cross_ref_id: &str, ratings: &[(&str, &str)]) {
        let title = SecondaryTitle {
            response: Some("True".into()),
            ratings: ratings
                .iter()
                .map(|(source, value)| SecondaryRating {
                    source: source.to_string(),
                    value: value.to_string(),
                })
                .collect(),
            error: None,
        };
        self.titles
            .lock()
            .expect("titles")
            .insert(cross_ref_id.to_string(), Ok(title));
    }

    pub fn miss(&self, cross_ref_id: &str) {
        let title = SecondaryTitle {
            response: Some("False".into()),
            ratings: Vec::new(),
            error: Some("Incorrect IMDb ID.".into()),
        };
        self.titles
            .lock()
            .expect("titles")
            .insert(cross_ref_id.to_string(), Ok(title));
    }

    pub fn fail(&self, cross_ref_id: &str) {
        self.titles.lock().expect("titles").insert(
            cross_ref_id.to_string(),
            Err(ProviderError::Status {
                endpoint: "ratings lookup".into(),
                status: 503,
            }),
        );
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().expect("lookups").clone()
    }
}

#[async_trait]
impl RatingsProvider for FakeRatings {
    async fn lookup(&self, cross_ref_id: &str) -> Result<SecondaryTitle, ProviderError> {
        self.lookups
            .lock()
            .expect("lookups")
            .push(cross_ref_id.to_string());
        self.titles
            .lock()
            .expect("titles")
            .get(cross_ref_id)
            .cloned()
            .unwrap_or_else(|| {
                Err(ProviderError::network(
                    "ratings lookup",
                    format!("no scripted title for {cross_ref_id}"),
                ))
            })
    }
}
