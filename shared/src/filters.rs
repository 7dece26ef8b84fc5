//! Query parameters for list endpoints.
//!
//! Filters are typed per resource and every field is optional: an absent
//! value means "no filter" and is left out of the request entirely.

use std::fmt;

/// A resource's filter set, beyond free-text search.
pub trait ListFilters: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Key/value pairs for the filters that are set, in a stable order.
    fn query_pairs(&self) -> Vec<(&'static str, String)>;

    fn is_active(&self) -> bool {
        !self.query_pairs().is_empty()
    }
}

/// For resources whose list only supports search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFilters;

impl ListFilters for NoFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Everything that shapes a list request apart from the page cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams<F> {
    pub search: Option<String>,
    pub filters: F,
}

impl<F: ListFilters> ListParams<F> {
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.search.is_some() || self.filters.is_active()
    }

    /// Full query string pairs: paging first, then search, then filters.
    #[must_use]
    pub fn query_pairs(&self, page: u32, per_page: u32) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), page.to_string()),
            ("per_page".to_string(), per_page.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs.extend(
            self.filters
                .query_pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v)),
        );
        pairs
    }
}

/// Trims typed search text; blank input means no search.
#[must_use]
pub fn normalize_search(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub(crate) fn push_filter<V: fmt::Display>(
    pairs: &mut Vec<(&'static str, String)>,
    key: &'static str,
    value: Option<V>,
) {
    if let Some(value) = value {
        pairs.push((key, value.to_string()));
    }
}
