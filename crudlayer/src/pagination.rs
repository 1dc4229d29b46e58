use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::CrudError;

/// A validated request for one 0-indexed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl PageRequest {
    /// # Errors
    ///
    /// Returns [`CrudError::InvalidInput`] when `per_page` is zero.
    pub fn new(page: u64, per_page: u64) -> Result<Self, CrudError> {
        if per_page == 0 {
            return Err(CrudError::invalid_input("Page size must not be less than one"));
        }
        Ok(Self { page, per_page })
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of items before this page, saturating on absurd page numbers.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_mul(self.per_page)
    }

    /// `ceil(total_items / per_page)`, which is 0 for an empty store.
    #[must_use]
    pub const fn total_pages_for(&self, total_items: u64) -> u64 {
        total_items.div_ceil(self.per_page)
    }
}

/// One page of entities as returned by a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<E> {
    pub items: Vec<E>,
    pub total_pages: u64,
}

/// Paged data together with its pagination info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paged<A> {
    /// Data in the current page
    pub data: Vec<A>,
    /// Current 0-based page number
    pub page: u64,
    /// Number of items in a page
    pub per_page: u64,
    /// Number of total pages available
    pub total_pages: u64,
}

impl<A> Paged<A> {
    #[must_use]
    pub fn new(data: Vec<A>, request: PageRequest, total_pages: u64) -> Self {
        Self {
            data,
            page: request.page(),
            per_page: request.per_page(),
            total_pages,
        }
    }

    #[must_use]
    pub fn empty(page: u64, per_page: u64, total_pages: u64) -> Self {
        Self {
            data: Vec::new(),
            page,
            per_page,
            total_pages,
        }
    }

    /// Converts every item, keeping the pagination info.
    #[must_use]
    pub fn map<B>(self, f: impl FnMut(A) -> B) -> Paged<B> {
        Paged {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}
