use catalog_model::domain::CatalogItem;

/// Page number and the items accumulated so far for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationCursor {
    page: u32,
    items: Vec<CatalogItem>,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self {
            page: 1,
            items: Vec::new(),
        }
    }
}

impl PaginationCursor {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next_page(&self) -> u32 {
        self.page.saturating_add(1)
    }

    /// Replaces the contents with a fresh first page.
    pub fn with_first_page(items: Vec<CatalogItem>) -> Self {
        Self { page: 1, items }
    }

    /// Back on page 1, still holding the items on screen until a fresh first
    /// page replaces them.
    pub fn rewound(&self) -> Self {
        Self {
            page: 1,
            items: self.items.clone(),
        }
    }

    /// Appends a later page. Items keep provider order; earlier items never move.
    pub fn append_page(&mut self, page: u32, items: Vec<CatalogItem>) {
        debug_assert!(page > self.page, "pages are appended in increasing order");
        self.page = page;
        self.items.extend(items);
    }
}
