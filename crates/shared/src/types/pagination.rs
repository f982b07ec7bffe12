//! Pagination, sorting and archive-filter parameters for list endpoints.

use serde::{Deserialize, Serialize};

/// Largest page size a client may request.
pub const MAX_PER_PAGE: u64 = 100;

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    #[default]
    Desc,
}

/// Which records a listing includes with respect to their lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveScope {
    /// Active records only.
    ActiveOnly,
    /// Active and archived records.
    WithArchived,
    /// Archived records only.
    OnlyArchived,
}

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    /// Column to sort by; checked against a per-resource whitelist.
    #[serde(default)]
    pub sort_by: Option<String>,
    /// Sort direction.
    #[serde(default)]
    pub sort_direction: SortDirection,
    /// Include archived records.
    #[serde(default)]
    pub with_archived: bool,
    /// Return archived records only.
    #[serde(default)]
    pub only_archived: bool,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    15
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
            sort_by: None,
            sort_direction: SortDirection::default(),
            with_archived: false,
            only_archived: false,
        }
    }
}

impl PageRequest {
    /// Page number, at least 1.
    #[must_use]
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    /// Page size clamped to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn per_page(&self) -> u64 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.per_page()
    }

    /// Resolves the archive flags. `only_archived` wins over `with_archived`.
    #[must_use]
    pub const fn archive_scope(&self) -> ArchiveScope {
        if self.only_archived {
            ArchiveScope::OnlyArchived
        } else if self.with_archived {
            ArchiveScope::WithArchived
        } else {
            ArchiveScope::ActiveOnly
        }
    }

    /// Returns `sort_by` if it is in `allowed`, otherwise `default`.
    #[must_use]
    pub fn sort_column<'a>(&self, allowed: &[&'a str], default: &'a str) -> &'a str {
        self.sort_by
            .as_deref()
            .and_then(|requested| allowed.iter().find(|c| **c == requested).copied())
            .unwrap_or(default)
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u64,
    /// Items per page.
    pub per_page: u64,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl PageMeta {
    /// Builds metadata for a page of a collection with `total` items.
    #[must_use]
    pub fn new(request: &PageRequest, total: u64) -> Self {
        let per_page = request.per_page();
        Self {
            page: request.page(),
            per_page,
            total,
            total_pages: total.div_ceil(per_page).max(1),
        }
    }
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self {
            data,
            meta: PageMeta::new(request, total),
        }
    }

    /// Converts the items while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request(page: u64, per_page: u64) -> PageRequest {
        PageRequest {
            page,
            per_page,
            ..PageRequest::default()
        }
    }

    #[test]
    fn test_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page(), 1);
        assert_eq!(req.per_page(), 15);
        assert_eq!(req.offset(), 0);
        assert_eq!(req.archive_scope(), ArchiveScope::ActiveOnly);
        assert_eq!(req.sort_direction, SortDirection::Desc);
    }

    #[rstest]
    #[case(1, 15, 0, 15)]
    #[case(3, 10, 20, 10)]
    #[case(0, 10, 0, 10)]
    #[case(2, 500, 100, 100)]
    #[case(1, 0, 0, 1)]
    fn test_offset_and_limit(
        #[case] page: u64,
        #[case] per_page: u64,
        #[case] offset: u64,
        #[case] limit: u64,
    ) {
        let req = request(page, per_page);
        assert_eq!(req.offset(), offset);
        assert_eq!(req.limit(), limit);
    }

    #[rstest]
    #[case(0, 15, 1)]
    #[case(15, 15, 1)]
    #[case(16, 15, 2)]
    #[case(101, 100, 2)]
    fn test_total_pages(#[case] total: u64, #[case] per_page: u64, #[case] pages: u64) {
        let meta = PageMeta::new(&request(1, per_page), total);
        assert_eq!(meta.total_pages, pages);
    }

    #[test]
    fn test_archive_scope_prefers_only_archived() {
        let req = PageRequest {
            with_archived: true,
            only_archived: true,
            ..PageRequest::default()
        };
        assert_eq!(req.archive_scope(), ArchiveScope::OnlyArchived);

        let req = PageRequest {
            with_archived: true,
            ..PageRequest::default()
        };
        assert_eq!(req.archive_scope(), ArchiveScope::WithArchived);
    }

    #[test]
    fn test_sort_column_whitelist() {
        let allowed = ["name", "created_at"];
        let mut req = PageRequest::default();
        assert_eq!(req.sort_column(&allowed, "created_at"), "created_at");

        req.sort_by = Some("name".into());
        assert_eq!(req.sort_column(&allowed, "created_at"), "name");

        req.sort_by = Some("password; drop table".into());
        assert_eq!(req.sort_column(&allowed, "created_at"), "created_at");
    }

    #[test]
    fn test_map_keeps_meta() {
        let page = PageResponse::new(vec![1, 2], &request(2, 2), 5);
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.data, vec![10, 20]);
        assert_eq!(mapped.meta.page, 2);
        assert_eq!(mapped.meta.total_pages, 3);
    }
}
