use axum::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use crate::response::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE_SIZE: i64 = 100;

const INVALID_PAGINATION: &str = "Invalid pagination parameters";

/// A validated page window: `page >= 1` and `1 <= page_size <= MAX_PAGE_SIZE`.
///
/// As an extractor it reads `page` and `page_size` from the query string.
/// Missing values take the defaults; anything unparsable or out of range is
/// rejected with 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Option<Self> {
        if page < 1 || !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return None;
        }
        Some(Self { page, page_size })
    }

    /// Lenient form for internal callers: out-of-range values fall back to the defaults.
    pub fn normalized(page: i64, page_size: i64) -> Self {
        let page = if page < 1 { DEFAULT_PAGE } else { page };
        let page_size = if (1..=MAX_PAGE_SIZE).contains(&page_size) {
            page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        Self { page, page_size }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl TryFrom<PaginationQuery> for PageRequest {
    type Error = AppError;

    fn try_from(query: PaginationQuery) -> Result<Self, Self::Error> {
        PageRequest::new(
            query.page.unwrap_or(DEFAULT_PAGE),
            query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .ok_or(AppError::BadRequest(INVALID_PAGINATION))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PageRequest
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PaginationQuery>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest(INVALID_PAGINATION))?;
        PageRequest::try_from(query)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total_items: i64) -> Self {
        Self {
            current_page: request.page(),
            total_pages: total_pages(total_items, request.page_size()),
            total_items,
            items_per_page: request.page_size(),
        }
    }
}

/// `ceil(total_items / page_size)`, zero when there is nothing to show.
pub fn total_pages(total_items: i64, page_size: i64) -> i64 {
    if total_items <= 0 || page_size <= 0 {
        return 0;
    }
    (total_items + page_size - 1) / page_size
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: i64) -> Self {
        Self {
            items,
            pagination: Pagination::new(request, total_items),
        }
    }
}
