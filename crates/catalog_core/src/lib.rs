//! Catalog aggregation core: browsing, debounced search, pagination and detail
//! merging over a primary catalog provider and a secondary ratings provider.

pub mod adapter;
pub mod carousel;
pub mod config;
pub mod detail;
pub mod events;
pub mod intents;
pub mod pagination;
pub mod providers;
pub mod query_controller;
pub mod query_state;
pub mod session;

pub use carousel::{Carousel, CarouselState};
pub use config::{load_settings, load_settings_from, ProviderSettings};
pub use detail::{DetailAggregator, DetailError};
pub use events::{CatalogEvent, DetailView, ListingSnapshot, UserFacingError};
pub use intents::Intent;
pub use query_controller::{CommitOutcome, QueryController};
pub use session::{CatalogSession, SessionSnapshot};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
