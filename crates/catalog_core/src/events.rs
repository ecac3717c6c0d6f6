//! Outputs handed to the presentation layer.

use catalog_model::domain::{CatalogItem, Category, DetailRecord};

use crate::query_state::{Generation, QueryMode, QueryState};

pub const BROWSE_FAILURE_MESSAGE: &str =
    "Failed to fetch items. Please check your API key and network connection.";
pub const SEARCH_FAILURE_MESSAGE: &str = "Failed to fetch search results. Please try again later.";
pub const DETAIL_FAILURE_MESSAGE: &str = "Failed to load details. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    Browse,
    Home,
    LoadMore,
    Search,
    Details,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFacingError {
    context: ErrorContext,
    message: String,
}

impl UserFacingError {
    pub fn new(context: ErrorContext) -> Self {
        let message = match context {
            ErrorContext::Browse | ErrorContext::Home | ErrorContext::LoadMore => {
                BROWSE_FAILURE_MESSAGE
            }
            ErrorContext::Search => SEARCH_FAILURE_MESSAGE,
            ErrorContext::Details => DETAIL_FAILURE_MESSAGE,
        };
        Self {
            context,
            message: message.to_string(),
        }
    }

    pub fn context(&self) -> ErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What the list view shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingSnapshot {
    pub mode: QueryMode,
    pub category: Category,
    pub search_term: String,
    pub page: u32,
    pub items: Vec<CatalogItem>,
    pub hero: Vec<CatalogItem>,
    pub top_of_week: Vec<CatalogItem>,
    pub loading: bool,
    pub fetching_more: bool,
    pub error: Option<UserFacingError>,
    pub generation: Generation,
}

impl ListingSnapshot {
    pub(crate) fn from_query(query: &QueryState) -> Self {
        Self {
            mode: query.mode(),
            category: query.category(),
            search_term: query.search_term().to_string(),
            page: query.page(),
            items: query.items().to_vec(),
            generation: query.generation(),
            ..Self::default()
        }
    }

    pub fn can_load_more(&self) -> bool {
        self.mode == QueryMode::Browse
            && self.search_term.is_empty()
            && !self.items.is_empty()
            && !self.loading
            && !self.fetching_more
    }
}

/// What the detail view shows for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub item: CatalogItem,
    pub loading: bool,
    pub record: Option<DetailRecord>,
    pub error: Option<UserFacingError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    Listing(ListingSnapshot),
    Detail(Option<DetailView>),
    Carousel { active_index: usize },
}
