//! Page-number pagination for list views.
//!
//! # Usage
//!
//! ```rust,ignore
//! let request = PageRequest::from_params(&params, config.paginate_count, config.max_page_size);
//! let page = store.list_circuits(&filter, request).await?;
//! ```

use serde::Serialize;

use crate::common::FormData;

// ============================================================================
// Request
// ============================================================================

/// Requested page, already clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Read `page` and `per_page` from query parameters.
    ///
    /// Unparseable values fall back to the defaults rather than failing the
    /// request; `per_page` is capped at `max_per_page`.
    pub fn from_params(params: &FormData, default_per_page: u32, max_per_page: u32) -> Self {
        let page = params
            .get("page")
            .and_then(|p| p.parse::<u32>().ok())
            .unwrap_or(1);
        let per_page = params
            .get("per_page")
            .and_then(|p| p.parse::<u32>().ok())
            .unwrap_or(default_per_page)
            .min(max_per_page.max(1));
        Self::new(page, per_page)
    }

    /// Row offset for SQL `OFFSET`.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// Move an out-of-range page back onto the last page of `total` rows.
    pub fn clamp_to(self, total: u64) -> Self {
        let last = num_pages(total, self.per_page);
        Self::new(self.page.min(last), self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 50)
    }
}

fn num_pages(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    let pages = total.div_ceil(per_page).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

// ============================================================================
// Page
// ============================================================================

/// One page of rows plus the totals the template needs for its pager.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub num_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let num_pages = num_pages(total, request.per_page);
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            num_pages,
            has_next: request.page < num_pages,
            has_previous: request.page > 1,
        }
    }

    /// Slice an already-filtered, already-sorted vector.
    pub fn from_vec(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let request = request.clamp_to(total);
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.per_page as usize)
            .collect();
        Self::new(items, total, request)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
