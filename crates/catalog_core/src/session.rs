//! One user's catalog session: routes intents to the query controller, the
//! detail aggregator and the hero carousel, and composes their outputs.

use std::sync::{Arc, Weak};

use anyhow::Context;
use catalog_model::domain::{CatalogItem, Category};
use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        mpsc, oneshot, Mutex,
    },
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    adapter::ImageBases,
    carousel::CarouselController,
    config::ProviderSettings,
    detail::DetailAggregator,
    events::{CatalogEvent, DetailView, ErrorContext, ListingSnapshot, UserFacingError},
    intents::Intent,
    providers::{
        CatalogProvider, MissingRatingsProvider, OmdbClient, RatingsProvider, TmdbClient,
    },
    query_controller::{CommitOutcome, PageRequest, QueryController},
    query_state::QueryState,
};

pub const EVENT_CAPACITY: usize = 256;

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub listing: ListingSnapshot,
    pub detail: Option<DetailView>,
    pub active_index: usize,
}

type QueuedIntent = (Intent, oneshot::Sender<CommitOutcome>);

/// What is left of an intent once its state change has been made.
enum FollowUp {
    Done(CommitOutcome),
    Query(QueryState),
    NextPage(PageRequest),
    Details { token: u64, item: CatalogItem },
}

#[derive(Default)]
struct DetailSlot {
    selection: u64,
    view: Option<DetailView>,
}

pub struct CatalogSession {
    queries: Arc<QueryController>,
    details: DetailAggregator,
    carousel: Arc<CarouselController>,
    detail: Mutex<DetailSlot>,
    events: broadcast::Sender<CatalogEvent>,
    intents: mpsc::UnboundedSender<QueuedIntent>,
    background: Vec<JoinHandle<()>>,
}

impl CatalogSession {
    /// Must be called inside a tokio runtime; the intent queue and the
    /// carousel driver start immediately.
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        ratings: Arc<dyn RatingsProvider>,
        images: ImageBases,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (intents, queue) = mpsc::unbounded_channel();
        let queries = QueryController::new(Arc::clone(&catalog), images, events.clone());
        let carousel = CarouselController::new(0, events.clone());
        Arc::new_cyclic(|session| {
            let background = vec![
                process_intents(session.clone(), queue),
                carousel.spawn_auto_advance(),
                watch_hero_rail(Arc::clone(&carousel), events.subscribe()),
            ];
            Self {
                queries,
                details: DetailAggregator::new(catalog, ratings),
                carousel,
                detail: Mutex::new(DetailSlot::default()),
                events,
                intents,
                background,
            }
        })
    }

    /// Builds the HTTP-backed session. Without a secondary API key every
    /// ratings lookup reports absent.
    pub fn from_settings(settings: &ProviderSettings) -> anyhow::Result<Arc<Self>> {
        settings
            .validate()
            .context("provider settings are not usable")?;
        if settings.tmdb_api_key.trim().is_empty() {
            warn!("primary catalog API key is empty; requests will be rejected");
        }
        let catalog: Arc<dyn CatalogProvider> = Arc::new(TmdbClient::new(settings));
        let ratings: Arc<dyn RatingsProvider> = if settings.omdb_api_key.trim().is_empty() {
            warn!("secondary ratings API key is empty; ratings disabled");
            Arc::new(MissingRatingsProvider)
        } else {
            Arc::new(OmdbClient::new(settings))
        };
        info!(api_url = %settings.tmdb_api_url, "catalog session configured");
        Ok(Self::new(catalog, ratings, ImageBases::from_settings(settings)))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            listing: self.queries.snapshot().await,
            detail: self.detail.lock().await.view.clone(),
            active_index: self.carousel.active_index().await,
        }
    }

    /// Loads the home screen.
    pub async fn start(&self) -> CommitOutcome {
        self.handle(Intent::SelectCategory(Category::Home)).await
    }

    /// Queues `intent` behind every intent dispatched before it. The receiver
    /// resolves once the intent's request, if any, has been committed.
    pub fn dispatch(&self, intent: Intent) -> oneshot::Receiver<CommitOutcome> {
        let (reply, outcome) = oneshot::channel();
        if self.intents.send((intent, reply)).is_err() {
            warn!("intent queue closed");
        }
        outcome
    }

    /// Dispatches `intent` and waits for it. Intents that issue no request
    /// report `Applied`.
    pub async fn handle(&self, intent: Intent) -> CommitOutcome {
        self.dispatch(intent).await.unwrap_or(CommitOutcome::Rejected)
    }

    /// Makes the state change for `intent`. Runs on the queue, one intent at a time.
    async fn apply(&self, intent: Intent) -> FollowUp {
        debug!(intent = intent.name(), "intent received");
        match intent {
            Intent::SelectCategory(category) => {
                FollowUp::Query(self.queries.begin_category(category).await)
            }
            Intent::SetSearchText(text) => {
                self.queries.set_search_term(text).await;
                FollowUp::Done(CommitOutcome::Applied)
            }
            Intent::RequestLoadMore => match self.queries.begin_load_more().await {
                Some(request) => FollowUp::NextPage(request),
                None => FollowUp::Done(CommitOutcome::Rejected),
            },
            Intent::SelectItem(item) => {
                let token = self.begin_selection(&item).await;
                FollowUp::Details { token, item }
            }
            Intent::DeselectItem => {
                self.deselect_item().await;
                FollowUp::Done(CommitOutcome::Applied)
            }
            Intent::PointerDown { x } => {
                self.carousel.pointer_down(x).await;
                FollowUp::Done(CommitOutcome::Applied)
            }
            Intent::PointerMove { x } => {
                self.carousel.pointer_move(x).await;
                FollowUp::Done(CommitOutcome::Applied)
            }
            Intent::PointerUp => {
                self.carousel.pointer_up().await;
                FollowUp::Done(CommitOutcome::Applied)
            }
            Intent::SelectCarouselIndex(index) => {
                self.carousel.select(index).await;
                FollowUp::Done(CommitOutcome::Applied)
            }
            Intent::CarouselNext => {
                self.carousel.next().await;
                FollowUp::Done(CommitOutcome::Applied)
            }
            Intent::CarouselPrevious => {
                self.carousel.previous().await;
                FollowUp::Done(CommitOutcome::Applied)
            }
        }
    }

    /// Waits on the request an applied intent issued and commits its result.
    async fn complete(&self, follow_up: FollowUp) -> CommitOutcome {
        match follow_up {
            FollowUp::Done(outcome) => outcome,
            FollowUp::Query(query) => self.queries.run_query(query).await,
            FollowUp::NextPage(request) => self.queries.finish_load_more(request).await,
            FollowUp::Details { token, item } => self.finish_selection(token, item).await,
        }
    }

    /// Shows `item` right away as loading.
    async fn begin_selection(&self, item: &CatalogItem) -> u64 {
        let mut slot = self.detail.lock().await;
        slot.selection += 1;
        slot.view = Some(DetailView {
            item: item.clone(),
            loading: true,
            record: None,
            error: None,
        });
        self.publish_detail(&slot);
        slot.selection
    }

    /// Fills in the details of the item selected under `token`. A newer
    /// selection or a deselection discards the result.
    async fn finish_selection(&self, token: u64, item: CatalogItem) -> CommitOutcome {
        let result = self.details.load_details(&item).await;

        let mut slot = self.detail.lock().await;
        if slot.selection != token {
            debug!(key = %item.key(), token, current = slot.selection, "dropping stale details");
            return CommitOutcome::Stale;
        }
        let Some(view) = slot.view.as_mut() else {
            return CommitOutcome::Stale;
        };
        view.loading = false;
        let outcome = match result {
            Ok(record) => {
                view.record = Some(record);
                CommitOutcome::Applied
            }
            Err(err) => {
                error!(key = %err.item, kind = ?err.source.kind(), error = %err, "details failed");
                view.error = Some(UserFacingError::new(ErrorContext::Details));
                CommitOutcome::Failed
            }
        };
        self.publish_detail(&slot);
        outcome
    }

    async fn deselect_item(&self) {
        let mut slot = self.detail.lock().await;
        slot.selection += 1;
        slot.view = None;
        self.publish_detail(&slot);
    }

    fn publish_detail(&self, slot: &DetailSlot) {
        let _ = self.events.send(CatalogEvent::Detail(slot.view.clone()));
    }
}

impl Drop for CatalogSession {
    fn drop(&mut self) {
        for task in &self.background {
            task.abort();
        }
    }
}

/// Applies queued intents strictly in arrival order. Only the waits on
/// issued requests leave the queue, each on its own task.
fn process_intents(
    session: Weak<CatalogSession>,
    mut queue: mpsc::UnboundedReceiver<QueuedIntent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some((intent, reply)) = queue.recv().await {
            let Some(session) = session.upgrade() else {
                break;
            };
            match session.apply(intent).await {
                FollowUp::Done(outcome) => {
                    let _ = reply.send(outcome);
                }
                follow_up => {
                    tokio::spawn(async move {
                        let outcome = session.complete(follow_up).await;
                        let _ = reply.send(outcome);
                    });
                }
            }
        }
    })
}

/// Keeps the carousel sized to the hero rail.
fn watch_hero_rail(
    carousel: Arc<CarouselController>,
    mut events: broadcast::Receiver<CatalogEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(CatalogEvent::Listing(listing)) => {
                    carousel.reseed_if_resized(listing.hero.len()).await;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "hero rail watcher fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
