//! Cursor pagination over a sorted key domain.
//!
//! Both store backends page the same way: build the sorted key domain
//! (submodels by id, element children by idShort or stringified list
//! position), locate the cursor's position in it, and slice strictly after
//! that position. Keeping the slicing in one place is what makes paging
//! indistinguishable across backends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Client-supplied paging window.
///
/// `limit` of `None` or `Some(0)` means "the remainder, unpaginated".
/// `cursor` names the key of the last item of the previous page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

impl PaginationInfo {
    /// Everything, starting from the front.
    pub const NO_LIMIT: PaginationInfo = PaginationInfo {
        limit: None,
        cursor: None,
    };

    pub fn new(limit: Option<usize>, cursor: Option<String>) -> Self {
        PaginationInfo { limit, cursor }
    }

    pub fn has_limit(&self) -> bool {
        matches!(self.limit, Some(limit) if limit > 0)
    }
}

/// One page of results plus the cursor for the next page.
///
/// `cursor` is the key of the last returned item, or `None` when the page
/// reached the end of the domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorResult<T> {
    pub cursor: Option<String>,
    pub result: T,
}

impl<T> CursorResult<T> {
    pub fn new(cursor: Option<String>, result: T) -> Self {
        CursorResult { cursor, result }
    }
}

/// Index of the first item strictly after `cursor` in an ascending key
/// sequence.
///
/// An absent cursor, or one naming a key outside the domain, positions at
/// the start. This is the one cursor policy of the whole system; a stale
/// cursor restarts the walk instead of erroring.
pub fn cursor_position<'a, I>(keys: I, cursor: Option<&str>) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    match cursor {
        None => 0,
        Some(cursor) => keys
            .into_iter()
            .position(|key| key == cursor)
            .map(|index| index + 1)
            .unwrap_or(0),
    }
}

/// Pages over a sorted key domain.
pub struct PaginationSupport<T> {
    sorted: BTreeMap<String, T>,
}

impl<T> PaginationSupport<T> {
    pub fn new(sorted: BTreeMap<String, T>) -> Self {
        PaginationSupport { sorted }
    }

    /// Collects items into the sorted domain, keying each with `key_of`.
    /// The first item wins on key duplicates.
    pub fn from_items<I>(items: I, key_of: impl Fn(&T) -> String) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut sorted = BTreeMap::new();
        for item in items {
            sorted.entry(key_of(&item)).or_insert(item);
        }
        PaginationSupport { sorted }
    }

    /// Cuts one page out of the domain, in ascending key order.
    pub fn paged(self, info: &PaginationInfo) -> CursorResult<Vec<T>> {
        let entries: Vec<(String, T)> = self.sorted.into_iter().collect();
        let total = entries.len();

        let start = cursor_position(
            entries.iter().map(|(key, _)| key.as_str()),
            info.cursor.as_deref(),
        );
        let take = match info.limit {
            Some(limit) if limit > 0 => limit.min(total - start),
            _ => total - start,
        };
        let end = start + take;

        let cursor = if end < total && take > 0 {
            Some(entries[end - 1].0.clone())
        } else {
            None
        };
        let result = entries
            .into_iter()
            .skip(start)
            .take(take)
            .map(|(_, item)| item)
            .collect();
        CursorResult::new(cursor, result)
    }
}
