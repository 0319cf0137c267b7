// src/api/paging.rs
//! Listing windows: the request-shaping value and the typed page result.

use crate::constants::UNBOUNDED_MAX_ITEMS;
use crate::convert::ObjectConverter;
use crate::error::AppError;
use crate::model::{DomainObject, RawPagedResult};
use serde::Serialize;

/// Request shaping for one window of a listing.
///
/// Sorting and keyword filtering are forwarded to the transport; the
/// results are never re-sorted or re-filtered locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingContext {
    pub skip_count: u32,
    /// `0` leaves the window size to the server.
    pub max_items: u32,
    pub sort_property: Option<String>,
    pub ascending: bool,
    pub keyword: Option<String>,
}

impl Default for ListingContext {
    fn default() -> Self {
        Self {
            skip_count: 0,
            max_items: UNBOUNDED_MAX_ITEMS,
            sort_property: None,
            ascending: true,
            keyword: None,
        }
    }
}

fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl ListingContext {
    pub fn with_skip(mut self, skip_count: u32) -> Self {
        self.skip_count = skip_count;
        self
    }

    pub fn with_max_items(mut self, max_items: u32) -> Self {
        self.max_items = max_items;
        self
    }

    /// Sorts ascending by `property`; an empty id clears the sort.
    pub fn with_sort(mut self, property: impl Into<String>) -> Self {
        self.sort_property = non_empty(property);
        self
    }

    pub fn descending(mut self) -> Self {
        self.ascending = false;
        self
    }

    /// An empty keyword clears the filter.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = non_empty(keyword);
        self
    }

    pub fn is_bounded(&self) -> bool {
        self.max_items != UNBOUNDED_MAX_ITEMS
    }

    /// The context for the window after this one.
    pub fn next_page(&self) -> Self {
        Self {
            skip_count: self.skip_count.saturating_add(self.max_items),
            ..self.clone()
        }
    }
}

/// Total size of a listing, when the server reports one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum TotalItems {
    Known(u64),
    #[default]
    Unknown,
}

impl TotalItems {
    pub fn known(&self) -> Option<u64> {
        match self {
            Self::Known(total) => Some(*total),
            Self::Unknown => None,
        }
    }
}

impl From<Option<u64>> for TotalItems {
    fn from(total: Option<u64>) -> Self {
        total.map_or(Self::Unknown, Self::Known)
    }
}

/// One window of typed results, in server order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingResult<T> {
    pub items: Vec<T>,
    pub has_more_items: bool,
    pub total_items: TotalItems,
}

impl<T> PagingResult<T> {
    pub fn new(items: Vec<T>, has_more_items: bool, total_items: TotalItems) -> Self {
        Self {
            items,
            has_more_items,
            total_items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transforms the items, keeping the paging signals.
    pub fn map<U, F>(self, f: F) -> PagingResult<U>
    where
        F: FnMut(T) -> U,
    {
        PagingResult {
            items: self.items.into_iter().map(f).collect(),
            has_more_items: self.has_more_items,
            total_items: self.total_items,
        }
    }
}

/// Converts a raw listing window into typed objects.
///
/// The server's has-more and total signals are carried through. A server
/// that overshoots a bounded window is cut back to `max_items`, and the
/// dropped items are reported as "more available".
pub async fn apply_paging(
    converter: &ObjectConverter,
    raw: RawPagedResult,
    listing: &ListingContext,
) -> Result<PagingResult<DomainObject>, AppError> {
    let RawPagedResult {
        mut items,
        mut has_more_items,
        total_items,
    } = raw;

    let max_items = listing.max_items as usize;
    if listing.is_bounded() && items.len() > max_items {
        log::warn!(
            "Server returned {} items for a window of {}; truncating",
            items.len(),
            max_items
        );
        items.truncate(max_items);
        has_more_items = true;
    }

    let converted = converter.convert_many(&items).await?;
    log::debug!(
        "Converted listing window: skip={}, items={}, has_more={}",
        listing.skip_count,
        converted.len(),
        has_more_items
    );

    Ok(PagingResult::new(
        converted,
        has_more_items,
        TotalItems::from(total_items),
    ))
}
