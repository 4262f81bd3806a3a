//! Pagination contract shared by repositories and services.
//!
//! Services accept raw [`PaginationParams`] from callers and normalize them
//! into a [`PageRequest`]. Repositories only ever see a `PageRequest`, so an
//! invalid page number or size cannot reach the storage layer.

use serde::{Deserialize, Serialize};

use domain::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Raw pagination input as supplied by a caller
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE_NUMBER as i64
}

fn default_per_page() -> i64 {
    DEFAULT_PAGE_SIZE as i64
}

impl PaginationParams {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self { page, per_page }
    }

    /// Apply the service-layer rules: a page below 1 becomes the first page,
    /// a size below 1 or above [`MAX_PAGE_SIZE`] becomes [`DEFAULT_PAGE_SIZE`].
    pub fn normalize(&self) -> PageRequest {
        let number = if self.page < 1 {
            DEFAULT_PAGE_NUMBER
        } else {
            self.page as u64
        };
        let size = if self.per_page < 1 || self.per_page as u64 > MAX_PAGE_SIZE {
            DEFAULT_PAGE_SIZE
        } else {
            self.per_page as u64
        };

        PageRequest { number, size }
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// A validated, 1-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    number: u64,
    size: u64,
}

impl PageRequest {
    /// Returns `None` unless both the page number and the size are positive.
    pub fn new(number: u64, size: u64) -> Option<Self> {
        (number >= 1 && size >= 1).then_some(Self { number, size })
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of entries preceding this page
    pub fn offset(&self) -> u64 {
        (self.number - 1).saturating_mul(self.size)
    }
}

/// One page of results plus navigation metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub page_number: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl PaginationMeta {
    pub fn new(page: PageRequest, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(page.size);

        Self {
            page_number: page.number,
            page_size: page.size,
            total_count,
            total_pages,
            has_previous_page: page.number > 1,
            has_next_page: page.number < total_pages,
        }
    }
}

impl<T> Paginated<T> {
    /// Wrap an already-sliced page.
    pub fn new(data: Vec<T>, page: PageRequest, total_count: u64) -> Self {
        Self {
            data,
            meta: PaginationMeta::new(page, total_count),
        }
    }

    /// Cut one page out of the complete, already filtered result set.
    pub fn slice(filtered: Vec<T>, page: PageRequest) -> Self {
        let total_count = filtered.len() as u64;
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.size).unwrap_or(usize::MAX);
        let data = filtered.into_iter().skip(skip).take(take).collect();

        Self::new(data, page, total_count)
    }

    /// Transform each item while keeping the metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}
