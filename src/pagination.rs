// 📄 Pagination - page/pageSize query parameters and slicing
//
// Pages are 1-based. A page past the end yields an empty slice, never an
// error. `pageSize=0` is a valid request for an empty page.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl PageParams {
    pub fn new(page: usize, page_size: usize) -> Self {
        PageParams {
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    /// Page number, at least 1
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, capped at MAX_PAGE_SIZE
    pub fn page_size(&self) -> usize {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

/// Number of items on `page`: min(page_size, total - (page-1)*page_size), floored at 0
pub fn page_len(total: usize, page: usize, page_size: usize) -> usize {
    let skipped = page.saturating_sub(1).saturating_mul(page_size);
    total.saturating_sub(skipped).min(page_size)
}

pub fn paginate<T>(items: Vec<T>, params: &PageParams) -> Paginated<T> {
    let page = params.page();
    let page_size = params.page_size();
    let total = items.len();
    let total_pages = if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    };

    let skip = (page - 1).saturating_mul(page_size);
    let take = page_len(total, page, page_size);

    Paginated {
        items: items.into_iter().skip(skip).take(take).collect(),
        pagination: PageInfo {
            page,
            page_size,
            total,
            total_pages,
        },
    }
}

// ============================================================================
// TESTS
// ============================================================================
