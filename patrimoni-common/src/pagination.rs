//! Pagination utilities
//!
//! Page/limit bookkeeping for list views. Pages are 1-indexed and the
//! current page is always kept within `[1, pages]`.

/// Pagination metadata calculated from a known total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: u32,
    /// Total number of pages (at least 1)
    pub pages: u32,
    /// Number of items to skip
    pub offset: u64,
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, pages]
///
/// # Examples
/// ```
/// use patrimoni_common::pagination::calculate_pagination;
///
/// // 250 total results at 100 per page = 3 pages
/// let p = calculate_pagination(250, 2, 100);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.pages, 3);
/// assert_eq!(p.offset, 100);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(250, 99, 100);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 200);
/// ```
pub fn calculate_pagination(total_results: u64, requested_page: i64, limit: u32) -> Pagination {
    let limit = u64::from(limit.max(1));
    let pages = total_results.div_ceil(limit).clamp(1, u64::from(u32::MAX)) as u32;
    let page = clamp_page(requested_page, pages);
    Pagination {
        page,
        pages,
        offset: u64::from(page - 1) * limit,
    }
}

fn clamp_page(requested: i64, pages: u32) -> u32 {
    requested.clamp(1, i64::from(pages.max(1))) as u32
}

/// One page obtained through the over-fetch pattern
#[derive(Debug, Clone, PartialEq)]
pub struct OverFetched<T> {
    /// At most `limit` items, in server order
    pub items: Vec<T>,
    /// The server returned more than `limit` items
    pub has_next: bool,
}

/// Current position in a paged list
///
/// `pages` defaults to 1 when the total is unknown. For endpoints without
/// a total count, request [`PageCursor::overfetch_limit`] items and feed
/// the result to [`PageCursor::apply_overfetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: u32,
    pages: u32,
    limit: u32,
}

impl PageCursor {
    /// Start on page 1 of 1
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            pages: 1,
            limit: limit.max(1),
        }
    }

    /// Start at `page` of `pages`, clamped
    pub fn at(page: i64, pages: u32, limit: u32) -> Self {
        let pages = pages.max(1);
        Self {
            page: clamp_page(page, pages),
            pages,
            limit: limit.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Advance one page, staying on the last page
    pub fn next(&mut self) -> u32 {
        self.page = self.page.saturating_add(1).min(self.pages);
        self.page
    }

    /// Go back one page, staying on the first page
    pub fn prev(&mut self) -> u32 {
        self.page = self.page.saturating_sub(1).max(1);
        self.page
    }

    /// Jump to `page`, clamped into `[1, pages]`
    pub fn go_to(&mut self, page: i64) -> u32 {
        self.page = clamp_page(page, self.pages);
        self.page
    }

    /// Update the known page count; the current page is re-clamped
    pub fn set_pages(&mut self, pages: u32) {
        self.pages = pages.max(1);
        self.page = self.page.min(self.pages);
    }

    /// Change the page size; returns to page 1
    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit.max(1);
        self.page = 1;
    }

    /// Items to skip for `skip`/`limit` endpoints
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Items to request when the server gives no total
    pub fn overfetch_limit(&self) -> u32 {
        self.limit.saturating_add(1)
    }

    /// Trim an over-fetched page to `limit` items and update `pages`
    ///
    /// When more than `limit` items came back a next page is known to
    /// exist, so `pages` becomes `page + 1`; otherwise this is the last page.
    pub fn apply_overfetch<T>(&mut self, mut items: Vec<T>) -> OverFetched<T> {
        let limit = self.limit as usize;
        let has_next = items.len() > limit;
        items.truncate(limit);
        self.pages = if has_next {
            self.page.saturating_add(1)
        } else {
            self.page
        };
        OverFetched { items, has_next }
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PAGE_LIMIT)
    }
}
