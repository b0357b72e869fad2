use serde::Serialize;

/// Number of posts on every listing page.
pub const PAGE_SIZE: i64 = 10;

/// Which page of a listing to fetch.
///
/// Numbers are 1-indexed. Numbers outside the listing are clamped to the first
/// or last page when the query runs, they never fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// Requested page number.
    pub number: i64,
    /// Items per page.
    pub size: i64,
}

impl PageRequest {
    /// Requests page `number` with the default [`PAGE_SIZE`].
    #[must_use]
    pub fn new(number: i64) -> Self {
        Self {
            number,
            size: PAGE_SIZE,
        }
    }

    /// Parses the raw `?page=` value. Missing or non-numeric values select page 1.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<i64>().ok())
            .map_or_else(|| Self::new(1), Self::new)
    }

    /// Overrides the page size.
    #[must_use]
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    pub(crate) fn resolve(self, total: i64) -> PageWindow {
        let size = self.size.max(1);
        let num_pages = ((total.max(0) + size - 1) / size).max(1);
        let number = self.number.clamp(1, num_pages);
        PageWindow {
            number,
            num_pages,
            limit: size,
            offset: (number - 1) * size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub(crate) number: i64,
    pub(crate) num_pages: i64,
    pub(crate) limit: i64,
    pub(crate) offset: i64,
}

/// One page of a listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page, in listing order.
    pub items: Vec<T>,
    /// The page actually served after clamping.
    pub number: i64,
    /// Pages in the listing, at least one.
    pub num_pages: i64,
    /// Items across all pages.
    pub total: i64,
    /// Whether a page precedes this one.
    pub has_previous: bool,
    /// Whether a page follows this one.
    pub has_next: bool,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, window: PageWindow, total: i64) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total,
            has_previous: window.number > 1,
            has_next: window.number < window.num_pages,
        }
    }

    /// An empty first page.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), PageRequest::default().resolve(0), 0)
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
