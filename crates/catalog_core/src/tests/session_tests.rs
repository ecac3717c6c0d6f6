use super::*;

use catalog_model::domain::{ItemId, MediaKind, IMDB_SOURCE};
use serde_json::json;

use crate::{
    events::DETAIL_FAILURE_MESSAGE,
    query_controller::SEARCH_DEBOUNCE,
    test_support::{listed, titles, FakeCatalog, FakeRatings},
};

fn session(catalog: &Arc<FakeCatalog>, ratings: &Arc<FakeRatings>) -> Arc<CatalogSession> {
    CatalogSession::new(catalog.clone(), ratings.clone(), ImageBases::default())
}

fn item(id: i64) -> CatalogItem {
    CatalogItem {
        id: ItemId(id),
        title: format!("item {id}"),
        description: "synopsis".into(),
        media_kind: MediaKind::Movie,
        poster_url: "https://img/p.jpg".into(),
        backdrop_url: "https://img/b.jpg".into(),
        rating: None,
        release_date: None,
    }
}

fn script_details(catalog: &FakeCatalog, id: i64) {
    catalog.respond(
        &format!("details/movie/{id}"),
        json!({"id": id, "title": format!("details {id}")}),
    );
    catalog.respond(&format!("videos/movie/{id}"), json!({"results": []}));
    catalog.respond(
        &format!("external_ids/movie/{id}"),
        json!({"imdb_id": format!("tt{id}")}),
    );
}

fn script_home(catalog: &FakeCatalog, hero_len: i64) {
    let hero: Vec<_> = (1..=hero_len).map(|id| listed(id, "hero")).collect();
    catalog.respond_page("trending/movie", &hero);
    catalog.respond_page("trending/all", &[listed(50, "weekly")]);
    catalog.respond_page("discover/movie/1", &[listed(100, "popular")]);
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn start_sizes_the_carousel_to_the_hero_rail() {
    let catalog = FakeCatalog::new();
    let ratings = FakeRatings::new();
    script_home(&catalog, 3);
    let session = session(&catalog, &ratings);

    assert_eq!(session.start().await, CommitOutcome::Applied);
    settle().await;

    session.handle(Intent::CarouselPrevious).await;
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.listing.hero.len(), 3);
    assert_eq!(snapshot.active_index, 2);
    assert!(snapshot.detail.is_none());
}

#[tokio::test]
async fn pointer_intents_swipe_the_carousel() {
    let catalog = FakeCatalog::new();
    let ratings = FakeRatings::new();
    script_home(&catalog, 5);
    let session = session(&catalog, &ratings);
    session.start().await;
    settle().await;

    session.handle(Intent::PointerDown { x: 300.0 }).await;
    session.handle(Intent::PointerMove { x: 240.0 }).await;
    session.handle(Intent::PointerUp).await;
    assert_eq!(session.snapshot().await.active_index, 1);

    session.handle(Intent::PointerDown { x: 300.0 }).await;
    session.handle(Intent::PointerMove { x: 330.0 }).await;
    session.handle(Intent::PointerUp).await;
    assert_eq!(session.snapshot().await.active_index, 1);

    session.handle(Intent::SelectCarouselIndex(4)).await;
    session.handle(Intent::CarouselNext).await;
    assert_eq!(session.snapshot().await.active_index, 0);
}

#[tokio::test]
async fn leaving_home_resets_the_carousel() {
    let catalog = FakeCatalog::new();
    let ratings = FakeRatings::new();
    script_home(&catalog, 4);
    catalog.respond_page("discover/tv/1", &[listed(7, "show")]);
    let session = session(&catalog, &ratings);
    session.start().await;
    settle().await;
    session.handle(Intent::SelectCarouselIndex(2)).await;

    session.handle(Intent::SelectCategory(Category::Tv)).await;
    settle().await;

    let snapshot = session.snapshot().await;
    assert!(snapshot.listing.hero.is_empty());
    assert_eq!(snapshot.active_index, 0);
    assert_eq!(snapshot.listing.items.len(), 1);
}

#[tokio::test]
async fn selecting_an_item_publishes_loading_then_record() {
    let catalog = FakeCatalog::new();
    let ratings = FakeRatings::new();
    script_details(&catalog, 603);
    ratings.respond("tt603", &[(IMDB_SOURCE, "8.7/10")]);
    let session = session(&catalog, &ratings);
    let mut events = session.subscribe_events();

    let outcome = session.handle(Intent::SelectItem(item(603))).await;
    assert_eq!(outcome, CommitOutcome::Applied);

    match events.recv().await.expect("loading event") {
        CatalogEvent::Detail(Some(view)) => {
            assert!(view.loading);
            assert_eq!(view.item.id, ItemId(603));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    let view = session.snapshot().await.detail.expect("detail view");
    assert!(!view.loading);
    let record = view.record.expect("record");
    assert_eq!(record.primary.title, "details 603");
    assert_eq!(record.rating_from(IMDB_SOURCE), "8.7/10");
}

#[tokio::test]
async fn superseded_selection_is_discarded() {
    let catalog = FakeCatalog::new();
    let ratings = FakeRatings::new();
    script_details(&catalog, 1);
    script_details(&catalog, 2);
    let release_first = catalog.gate("details/movie/1");
    let session = session(&catalog, &ratings);

    let first = session.dispatch(Intent::SelectItem(item(1)));
    catalog.wait_for_call("details/movie/1").await;
    assert_eq!(
        session.handle(Intent::SelectItem(item(2))).await,
        CommitOutcome::Applied
    );
    release_first.send(()).expect("release");

    assert_eq!(first.await.expect("join"), CommitOutcome::Stale);
    let view = session.snapshot().await.detail.expect("detail view");
    assert_eq!(view.item.id, ItemId(2));
    assert_eq!(
        view.record.map(|record| record.primary.title),
        Some("details 2".to_string())
    );
}

#[tokio::test]
async fn deselecting_drops_in_flight_details() {
    let catalog = FakeCatalog::new();
    let ratings = FakeRatings::new();
    script_details(&catalog, 1);
    let release = catalog.gate("details/movie/1");
    let session = session(&catalog, &ratings);

    let pending = session.dispatch(Intent::SelectItem(item(1)));
    catalog.wait_for_call("details/movie/1").await;
    session.handle(Intent::DeselectItem).await;
    release.send(()).expect("release");

    assert_eq!(pending.await.expect("join"), CommitOutcome::Stale);
    assert!(session.snapshot().await.detail.is_none());
}

#[tokio::test]
async fn detail_failure_is_shown_on_the_detail_view() {
    let catalog = FakeCatalog::new();
    let ratings = FakeRatings::new();
    catalog.fail("details/movie/9");
    let session = session(&catalog, &ratings);

    assert_eq!(
        session.handle(Intent::SelectItem(item(9))).await,
        CommitOutcome::Failed
    );

    let view = session.snapshot().await.detail.expect("detail view");
    assert!(!view.loading);
    assert!(view.record.is_none());
    let error = view.error.expect("error");
    assert_eq!(error.context(), ErrorContext::Details);
    assert_eq!(error.message(), DETAIL_FAILURE_MESSAGE);
}

#[tokio::test]
async fn load_more_intent_reaches_the_controller() {
    let catalog = FakeCatalog::new();
    let ratings = FakeRatings::new();
    script_home(&catalog, 1);
    catalog.respond_page("discover/movie/2", &[listed(101, "more")]);
    let session = session(&catalog, &ratings);
    session.start().await;

    assert_eq!(
        session.handle(Intent::RequestLoadMore).await,
        CommitOutcome::Applied
    );
    let listing = session.snapshot().await.listing;
    assert_eq!(listing.page, 2);
    assert_eq!(listing.items.len(), 2);
}

#[tokio::test]
async fn from_settings_rejects_unusable_urls() {
    let settings = ProviderSettings {
        tmdb_api_url: "not a url".into(),
        ..ProviderSettings::default()
    };
    assert!(CatalogSession::from_settings(&settings).is_err());

    let session = CatalogSession::from_settings(&ProviderSettings::default())
        .expect("default settings build a session");
    assert!(session.snapshot().await.listing.items.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rapid_keystrokes_keep_arrival_order_across_workers() {
    for _ in 0..100 {
        let catalog = FakeCatalog::new();
        let ratings = FakeRatings::new();
        let session = session(&catalog, &ratings);

        let pending: Vec<_> = ["d", "du", "dun", "dune"]
            .into_iter()
            .map(|text| session.dispatch(Intent::SetSearchText(text.into())))
            .collect();
        for outcome in pending {
            assert_eq!(outcome.await.expect("reply"), CommitOutcome::Applied);
        }

        assert_eq!(session.snapshot().await.listing.search_term, "dune");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn debounced_search_uses_the_last_dispatched_term() {
    let catalog = FakeCatalog::new();
    let ratings = FakeRatings::new();
    catalog.respond_page("search/dune/1", &[listed(438631, "Dune")]);
    let session = session(&catalog, &ratings);

    let pending: Vec<_> = ["d", "du", "dun", "dune"]
        .into_iter()
        .map(|text| session.dispatch(Intent::SetSearchText(text.into())))
        .collect();
    for outcome in pending {
        outcome.await.expect("reply");
    }
    tokio::time::sleep(SEARCH_DEBOUNCE * 2).await;

    assert_eq!(catalog.calls_starting_with("search/"), vec!["search/dune/1"]);
    let listing = session.snapshot().await.listing;
    assert_eq!(listing.search_term, "dune");
    assert_eq!(titles(&listing.items), vec!["Dune"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn category_switches_commit_the_last_selected_category() {
    for _ in 0..100 {
        let catalog = FakeCatalog::new();
        let ratings = FakeRatings::new();
        catalog.respond_page("discover/movie/1", &[listed(1, "film")]);
        catalog.respond_page("discover/tv/1", &[listed(2, "show")]);
        let session = session(&catalog, &ratings);

        let movie = session.dispatch(Intent::SelectCategory(Category::Movie));
        let tv = session.dispatch(Intent::SelectCategory(Category::Tv));
        movie.await.expect("reply");
        assert_eq!(tv.await.expect("reply"), CommitOutcome::Applied);

        let listing = session.snapshot().await.listing;
        assert_eq!(listing.category, Category::Tv);
        assert!(!listing.loading);
        assert_eq!(titles(&listing.items), vec!["show"]);
    }
}
