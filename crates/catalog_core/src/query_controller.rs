//! Owns the active query: resolves browse and search intents against the
//! primary provider, debounces typed text and drives pagination.

use std::{sync::Arc, time::Duration};

use catalog_model::{
    domain::{CatalogItem, Category, MediaKind},
    error::ProviderError,
};
use futures::future::join3;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    adapter::{normalize_listing, ImageBases},
    events::{CatalogEvent, ErrorContext, ListingSnapshot, UserFacingError},
    providers::{CatalogProvider, TrendingScope},
    query_state::{Generation, QueryMode, QueryState},
};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const TOP_OF_WEEK_LEN: usize = 10;
/// The anime category is served by a multi-kind search for this term.
pub const ANIME_QUERY: &str = "anime";

/// What became of a fetch once its response arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied,
    /// The query changed while the request was in flight; the response was dropped.
    Stale,
    Failed,
    /// The operation was not valid in the current state and issued no request.
    Rejected,
}

/// A load-more that has been accepted and is waiting for its page.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageRequest {
    generation: Generation,
    category: Category,
    page: u32,
}

struct ControllerState {
    query: QueryState,
    hero: Vec<CatalogItem>,
    top_of_week: Vec<CatalogItem>,
    loading: bool,
    fetching_more: bool,
    error: Option<UserFacingError>,
    debounce_task: Option<JoinHandle<()>>,
    debounce_seq: u64,
}

impl ControllerState {
    fn listing(&self) -> ListingSnapshot {
        ListingSnapshot {
            hero: self.hero.clone(),
            top_of_week: self.top_of_week.clone(),
            loading: self.loading,
            fetching_more: self.fetching_more,
            error: self.error.clone(),
            ..ListingSnapshot::from_query(&self.query)
        }
    }

    fn cancel_debounce(&mut self) {
        if let Some(task) = self.debounce_task.take() {
            task.abort();
        }
        self.debounce_seq += 1;
    }

    /// Installs a new query and marks it as loading.
    fn begin_query(&mut self, query: QueryState) -> QueryState {
        if query.category() != Category::Home {
            self.hero.clear();
            self.top_of_week.clear();
        }
        self.query = query;
        self.loading = true;
        self.fetching_more = false;
        self.error = None;
        self.query.clone()
    }

    fn accepts_more(&self) -> bool {
        self.query.mode() == QueryMode::Browse
            && self.query.search_term().is_empty()
            && !self.query.items().is_empty()
            && !self.loading
            && !self.fetching_more
            && self.debounce_task.is_none()
    }
}

pub struct QueryController {
    catalog: Arc<dyn CatalogProvider>,
    images: ImageBases,
    debounce: Duration,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<CatalogEvent>,
}

impl QueryController {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        images: ImageBases,
        events: broadcast::Sender<CatalogEvent>,
    ) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            images,
            debounce: SEARCH_DEBOUNCE,
            inner: Mutex::new(ControllerState {
                query: QueryState::default(),
                hero: Vec::new(),
                top_of_week: Vec::new(),
                loading: false,
                fetching_more: false,
                error: None,
                debounce_task: None,
                debounce_seq: 0,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ListingSnapshot {
        self.inner.lock().await.listing()
    }

    pub async fn query(&self) -> QueryState {
        self.inner.lock().await.query.clone()
    }

    /// Initial load of the home screen.
    pub async fn start(&self) -> CommitOutcome {
        self.set_category(Category::Home).await
    }

    pub async fn set_category(&self, category: Category) -> CommitOutcome {
        let query = self.begin_category(category).await;
        self.run_query(query).await
    }

    /// Installs the query for `category` and shows it as loading. The returned
    /// query is fetched with [`Self::run_query`].
    pub(crate) async fn begin_category(&self, category: Category) -> QueryState {
        let mut inner = self.inner.lock().await;
        inner.cancel_debounce();
        let next = inner.query.with_category(category);
        let query = inner.begin_query(next);
        self.publish(&inner);
        debug!(%category, generation = query.generation(), "category selected");
        query
    }

    /// Records typed text right away and issues the search once typing has
    /// been quiet for the debounce window. Each call replaces the pending timer.
    pub async fn set_search_term(self: &Arc<Self>, term: impl Into<String>) {
        let term = term.into();
        let mut inner = self.inner.lock().await;
        inner.cancel_debounce();
        inner.query = inner.query.with_pending_term(&term);
        let seq = inner.debounce_seq;

        let controller = Arc::clone(self);
        let delay = self.debounce;
        inner.debounce_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.fire_search(seq, term).await;
        }));
        self.publish(&inner);
    }

    pub async fn load_more(&self) -> CommitOutcome {
        match self.begin_load_more().await {
            Some(request) => self.finish_load_more(request).await,
            None => CommitOutcome::Rejected,
        }
    }

    /// Marks the next page as being fetched, or returns `None` when the
    /// current state does not accept one.
    pub(crate) async fn begin_load_more(&self) -> Option<PageRequest> {
        let mut inner = self.inner.lock().await;
        if !inner.accepts_more() {
            debug!(
                mode = ?inner.query.mode(),
                items = inner.query.items().len(),
                loading = inner.loading,
                fetching_more = inner.fetching_more,
                "load more ignored"
            );
            return None;
        }
        inner.fetching_more = true;
        self.publish(&inner);
        Some(PageRequest {
            generation: inner.query.generation(),
            category: inner.query.category(),
            page: inner.query.cursor().next_page(),
        })
    }

    pub(crate) async fn finish_load_more(&self, request: PageRequest) -> CommitOutcome {
        let PageRequest {
            generation,
            category,
            page,
        } = request;
        let result = self.fetch_page(category, page).await;

        let mut inner = self.inner.lock().await;
        if !inner.query.is_current(generation) {
            debug!(generation, page, "dropping stale load-more page");
            return CommitOutcome::Stale;
        }
        inner.fetching_more = false;
        let outcome = match result {
            Ok(items) => {
                info!(%category, page, count = items.len(), "appended page");
                inner.query = inner.query.with_appended_page(page, items);
                inner.error = None;
                CommitOutcome::Applied
            }
            Err(err) => {
                error!(%category, page, error = %err, "load more failed");
                inner.error = Some(UserFacingError::new(ErrorContext::LoadMore));
                CommitOutcome::Failed
            }
        };
        self.publish(&inner);
        outcome
    }

    async fn fire_search(&self, seq: u64, term: String) {
        let query = {
            let mut inner = self.inner.lock().await;
            if inner.debounce_seq != seq {
                return;
            }
            // Later keystrokes must not abort the request issued from here.
            inner.debounce_task = None;
            let next = if term.trim().is_empty() {
                inner.query.with_browse_restart()
            } else {
                inner.query.with_search(&term)
            };
            let query = inner.begin_query(next);
            self.publish(&inner);
            query
        };
        debug!(
            term = query.search_term(),
            generation = query.generation(),
            "debounce elapsed"
        );
        self.run_query(query).await;
    }

    pub(crate) async fn run_query(&self, query: QueryState) -> CommitOutcome {
        match query.mode() {
            QueryMode::Search => self.run_search(query).await,
            QueryMode::Browse if query.is_home() => self.fetch_home(query).await,
            QueryMode::Browse => self.run_browse(query).await,
        }
    }

    async fn run_browse(&self, query: QueryState) -> CommitOutcome {
        let result = self.fetch_page(query.category(), 1).await;
        self.commit_first_page(&query, result, ErrorContext::Browse)
            .await
    }

    async fn run_search(&self, query: QueryState) -> CommitOutcome {
        let result = self
            .catalog
            .search_multi(query.search_term(), 1)
            .await
            .map(|page| normalize_listing(&page.results, MediaKind::Unknown, &self.images));
        self.commit_first_page(&query, result, ErrorContext::Search)
            .await
    }

    /// Hero rail, top-of-week rail and the discovery list, fetched together.
    /// Rail failures degrade to empty rails; only a discovery failure is surfaced.
    async fn fetch_home(&self, query: QueryState) -> CommitOutcome {
        let (hero, weekly, discovery) = join3(
            self.catalog.trending_week(TrendingScope::Movies),
            self.catalog.trending_week(TrendingScope::AllKinds),
            self.fetch_page(Category::Home, 1),
        )
        .await;

        let hero = match hero {
            Ok(page) => normalize_listing(&page.results, MediaKind::Movie, &self.images),
            Err(err) => {
                warn!(error = %err, "hero rail unavailable");
                Vec::new()
            }
        };
        let top_of_week = match weekly {
            Ok(page) => {
                let ranked = &page.results[..page.results.len().min(TOP_OF_WEEK_LEN)];
                normalize_listing(ranked, MediaKind::Unknown, &self.images)
            }
            Err(err) => {
                warn!(error = %err, "top-of-week rail unavailable");
                Vec::new()
            }
        };

        let mut inner = self.inner.lock().await;
        if !inner.query.is_current(query.generation()) {
            debug!(generation = query.generation(), "dropping stale home load");
            return CommitOutcome::Stale;
        }
        inner.hero = hero;
        inner.top_of_week = top_of_week;
        let outcome = Self::apply_first_page(&mut inner, discovery, ErrorContext::Home);
        self.publish(&inner);
        outcome
    }

    async fn commit_first_page(
        &self,
        query: &QueryState,
        result: Result<Vec<CatalogItem>, ProviderError>,
        context: ErrorContext,
    ) -> CommitOutcome {
        let mut inner = self.inner.lock().await;
        if !inner.query.is_current(query.generation()) {
            debug!(
                generation = query.generation(),
                current = inner.query.generation(),
                "dropping stale response"
            );
            return CommitOutcome::Stale;
        }
        let outcome = Self::apply_first_page(&mut inner, result, context);
        self.publish(&inner);
        outcome
    }

    fn apply_first_page(
        inner: &mut ControllerState,
        result: Result<Vec<CatalogItem>, ProviderError>,
        context: ErrorContext,
    ) -> CommitOutcome {
        inner.loading = false;
        match result {
            Ok(items) => {
                info!(
                    category = %inner.query.category(),
                    mode = ?inner.query.mode(),
                    generation = inner.query.generation(),
                    count = items.len(),
                    "loaded first page"
                );
                inner.query = inner.query.with_first_page(items);
                inner.error = None;
                CommitOutcome::Applied
            }
            Err(err) => {
                error!(
                    category = %inner.query.category(),
                    kind = ?err.kind(),
                    error = %err,
                    "first page failed"
                );
                inner.error = Some(UserFacingError::new(context));
                CommitOutcome::Failed
            }
        }
    }

    async fn fetch_page(
        &self,
        category: Category,
        page: u32,
    ) -> Result<Vec<CatalogItem>, ProviderError> {
        let results = match category {
            Category::Anime => self.catalog.search_multi(ANIME_QUERY, page).await?,
            Category::Tv => self.catalog.discover(MediaKind::Series, page).await?,
            Category::Home | Category::Movie => {
                self.catalog.discover(MediaKind::Movie, page).await?
            }
        };
        Ok(normalize_listing(
            &results.results,
            category.context_kind(),
            &self.images,
        ))
    }

    fn publish(&self, inner: &ControllerState) {
        let _ = self.events.send(CatalogEvent::Listing(inner.listing()));
    }
}

#[cfg(test)]
#[path = "tests/query_controller_tests.rs"]
mod tests;
