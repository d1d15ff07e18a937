//! Page-number pagination primitives shared by listing endpoints.
//!
//! [`PageRequest`] parses and bounds the `page` query parameter, exposes the
//! SQL offset and limit, and [`Page`] wraps one slice of results together with
//! the total count so handlers can render page counts and navigation links.
//!
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::from_query(Some("3"), 10);
//! assert_eq!(request.offset(), 20);
//!
//! let page = Page::new(vec!["a", "b"], request, 22);
//! assert_eq!(page.total_pages(), 3);
//! assert!(!page.has_next());
//! ```

use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Query parameter carrying the one-based page number.
pub const PAGE_PARAM: &str = "page";

/// Errors raised when constructing a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Page numbers start at one.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

/// One-based page number plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Build a validated request.
    ///
    /// # Errors
    /// Returns [`PaginationError`] when either value is zero.
    pub const fn new(page: u32, per_page: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::ZeroPage);
        }
        if per_page == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self { page, per_page })
    }

    /// Parse a raw `page` query value leniently.
    ///
    /// Missing, malformed, or zero values fall back to the first page. A zero
    /// `per_page` is raised to one.
    #[must_use]
    pub fn from_query(raw: Option<&str>, per_page: u32) -> Self {
        let page = raw
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1);
        Self {
            page,
            per_page: per_page.max(1),
        }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Rows to skip before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    /// Rows to fetch for this page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.per_page as u64
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    page: u32,
    per_page: u32,
    total: u64,
    total_pages: u64,
}

impl<T> Page<T> {
    /// Wrap a slice of results fetched for `request`.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: total.div_ceil(u64::from(request.per_page)),
        }
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, yielding its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Total matching rows across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of pages needed for [`Self::total`] rows.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Transform each item, keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }

    /// Navigation links relative to `base`.
    ///
    /// Other query parameters on `base` (search, sort) are preserved; only
    /// [`PAGE_PARAM`] is replaced.
    #[must_use]
    pub fn links(&self, base: &Url) -> PageLinks {
        let at = |page: u64| with_page(base, page);
        PageLinks {
            current: at(u64::from(self.page)),
            previous: self.has_previous().then(|| at(u64::from(self.page) - 1)),
            next: self.has_next().then(|| at(u64::from(self.page) + 1)),
        }
    }
}

/// Links to neighbouring pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLinks {
    /// Link to this page.
    pub current: String,
    /// Link to the previous page, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// Link to the next page, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

fn with_page(base: &Url, page: u64) -> String {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(PAGE_PARAM, &page.to_string());
    url.to_string()
}
