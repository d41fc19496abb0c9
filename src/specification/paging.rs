// Copyright 2025 Cowboy AI, LLC.

//! Skip / take paging

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::{CriteriaError, CriteriaResult};

/// Skip / take window over the ordered matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Paging {
    /// Number of matches to skip
    pub skip: Option<usize>,
    /// Maximum number of matches to return
    pub take: Option<usize>,
}

impl Paging {
    /// Window for a 1-based page of `size` items
    pub fn page(page: usize, size: usize) -> CriteriaResult<Self> {
        if page == 0 {
            return Err(CriteriaError::InvalidPaging {
                reason: "page numbers start at 1".to_string(),
            });
        }
        if size == 0 {
            return Err(CriteriaError::InvalidPaging {
                reason: "page size must be positive".to_string(),
            });
        }
        let skip = (page - 1).checked_mul(size).ok_or_else(|| CriteriaError::InvalidPaging {
            reason: format!("page {page} of size {size} overflows"),
        })?;
        Ok(Self {
            skip: Some(skip),
            take: Some(size),
        })
    }

    /// True when neither skip nor take is set
    pub fn is_unbounded(&self) -> bool {
        self.skip.is_none() && self.take.is_none()
    }
}

/// Page metadata describing a skip / take window over a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Pagination {
    /// Page the window starts on (1-based)
    pub page: usize,
    /// Window size
    pub per_page: usize,
    /// Pages needed to cover every match
    pub total_pages: usize,
    /// Matches before the window was applied
    pub total_items: usize,
}

impl Pagination {
    /// Metadata for a window of `take` matches starting at `skip`
    ///
    /// A zero `take` counts as a window of one. Arithmetic saturates, so any
    /// skip a specification accepts is valid here.
    pub fn for_window(skip: usize, take: usize, total_items: usize) -> Self {
        let per_page = take.max(1);
        Self {
            page: (skip / per_page).saturating_add(1),
            per_page,
            total_pages: total_items.div_ceil(per_page),
            total_items,
        }
    }

    /// True when matches exist on a later page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1, 10 => (0, 10); "first page")]
    #[test_case(3, 25 => (50, 25); "third page")]
    #[test_case(2, 1 => (1, 1); "single item pages")]
    fn test_page_window(page: usize, size: usize) -> (usize, usize) {
        let paging = Paging::page(page, size).unwrap();
        (paging.skip.unwrap(), paging.take.unwrap())
    }

    #[test]
    fn test_invalid_pages_are_rejected() {
        assert!(matches!(Paging::page(0, 10), Err(CriteriaError::InvalidPaging { .. })));
        assert!(matches!(Paging::page(1, 0), Err(CriteriaError::InvalidPaging { .. })));
        assert!(Paging::page(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_pagination_for_window() {
        let pagination = Pagination::for_window(20, 10, 45);

        assert_eq!(pagination.page, 3);
        assert_eq!(pagination.total_pages, 5);
        assert!(pagination.has_next());

        let last = Pagination::for_window(40, 10, 45);
        assert!(!last.has_next());
    }

    #[test]
    fn test_pagination_saturates_on_huge_skip() {
        let pagination = Pagination::for_window(usize::MAX, 1, 3);

        assert_eq!(pagination.page, usize::MAX);
        assert_eq!(pagination.total_pages, 3);
        assert!(!pagination.has_next());

        let empty = Pagination::for_window(0, 0, 0);
        assert_eq!(empty.per_page, 1);
        assert_eq!(empty.total_pages, 0);
    }
}
