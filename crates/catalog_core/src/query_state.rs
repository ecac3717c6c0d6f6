//! The active query as an immutable value.
//!
//! Every query-defining change produces a new [`QueryState`] with a bumped
//! generation and a fresh cursor. Results are committed only when the
//! generation they were issued under is still current.

use catalog_model::domain::{CatalogItem, Category};
use serde::{Deserialize, Serialize};

use crate::pagination::PaginationCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    #[default]
    Browse,
    Search,
}

/// Monotonic token identifying the currently valid query.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryState {
    mode: QueryMode,
    category: Category,
    search_term: String,
    cursor: PaginationCursor,
    generation: Generation,
}

impl QueryState {
    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn page(&self) -> u32 {
        self.cursor.page()
    }

    pub fn items(&self) -> &[CatalogItem] {
        self.cursor.items()
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    /// Home screen: browsing the home category with no search text.
    pub fn is_home(&self) -> bool {
        self.mode == QueryMode::Browse
            && self.category == Category::Home
            && self.search_term.is_empty()
    }

    /// Browse `category` from its first page; any search text is cleared.
    pub fn with_category(&self, category: Category) -> Self {
        Self {
            mode: QueryMode::Browse,
            category,
            search_term: String::new(),
            cursor: PaginationCursor::default(),
            generation: self.generation + 1,
        }
    }

    /// Search for `term` from scratch, keeping the category for when search ends.
    pub fn with_search(&self, term: &str) -> Self {
        Self {
            mode: QueryMode::Search,
            category: self.category,
            search_term: term.to_string(),
            cursor: PaginationCursor::default(),
            generation: self.generation + 1,
        }
    }

    /// Back to browsing the current category from its first page.
    pub fn with_browse_restart(&self) -> Self {
        self.with_category(self.category)
    }

    /// Records typed text without starting a new query. The page goes back
    /// to 1 with the term; the items stay on screen until the debounced query
    /// replaces them.
    pub fn with_pending_term(&self, term: &str) -> Self {
        Self {
            search_term: term.to_string(),
            cursor: self.cursor.rewound(),
            ..self.clone()
        }
    }

    pub fn with_first_page(&self, items: Vec<CatalogItem>) -> Self {
        Self {
            cursor: PaginationCursor::with_first_page(items),
            ..self.clone()
        }
    }

    pub fn with_appended_page(&self, page: u32, items: Vec<CatalogItem>) -> Self {
        let mut cursor = self.cursor.clone();
        cursor.append_page(page, items);
        Self {
            cursor,
            ..self.clone()
        }
    }
}
