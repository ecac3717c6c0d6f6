use catalog_model::domain::{CatalogItem, Category};

/// Everything the presentation layer can ask of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SelectCategory(Category),
    SetSearchText(String),
    RequestLoadMore,
    SelectItem(CatalogItem),
    DeselectItem,
    PointerDown { x: f64 },
    PointerMove { x: f64 },
    /// Pointer released or left the carousel.
    PointerUp,
    SelectCarouselIndex(usize),
    CarouselNext,
    CarouselPrevious,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectCategory(_) => "select_category",
            Self::SetSearchText(_) => "set_search_text",
            Self::RequestLoadMore => "request_load_more",
            Self::SelectItem(_) => "select_item",
            Self::DeselectItem => "deselect_item",
            Self::PointerDown { .. } => "pointer_down",
            Self::PointerMove { .. } => "pointer_move",
            Self::PointerUp => "pointer_up",
            Self::SelectCarouselIndex(_) => "select_carousel_index",
            Self::CarouselNext => "carousel_next",
            Self::CarouselPrevious => "carousel_previous",
        }
    }
}
