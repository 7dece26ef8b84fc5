use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::list::FetchStatus;
use crate::DecodeError;

/// Mirror of the server's pagination envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub last_page: u32,
    #[serde(default)]
    pub total: u64,
}

impl Pagination {
    #[must_use]
    pub fn single_page(page: u32, total: u64) -> Self {
        Self {
            current_page: page,
            last_page: page,
            total,
        }
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page
    }

    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        self.has_more().then(|| self.current_page + 1)
    }
}

/// One decoded page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Deserialize)]
struct ListEnvelope {
    data: Map<String, Value>,
}

impl<T: DeserializeOwned> Page<T> {
    /// Decodes `{ data: { <items_key>: [...], pagination: {...} } }`.
    ///
    /// A missing `pagination` block means the whole result fits on the
    /// requested page.
    pub fn from_envelope(
        body: &[u8],
        items_key: &str,
        requested_page: u32,
    ) -> Result<Self, DecodeError> {
        let mut envelope: ListEnvelope =
            serde_json::from_slice(body).map_err(|e| DecodeError::Json(e.to_string()))?;

        let raw_items = envelope
            .data
            .remove(items_key)
            .ok_or_else(|| DecodeError::MissingField(items_key.to_string()))?;
        let items: Vec<T> =
            serde_json::from_value(raw_items).map_err(|e| DecodeError::Json(e.to_string()))?;

        let pagination = match envelope.data.remove("pagination") {
            Some(Value::Null) | None => {
                Pagination::single_page(requested_page, items.len() as u64)
            }
            Some(raw) => {
                serde_json::from_value(raw).map_err(|e| DecodeError::Json(e.to_string()))?
            }
        };

        Ok(Self { items, pagination })
    }
}

/// Load-more is only allowed from a settled list that has pages left.
#[must_use]
pub fn can_load_more(status: FetchStatus, pagination: Option<&Pagination>) -> bool {
    status == FetchStatus::Idle && pagination.is_some_and(Pagination::has_more)
}

/// Merges one page into the visible list: appended as-is within a session,
/// otherwise the list is replaced wholesale. Records are never deduplicated.
pub fn accumulate<T>(items: &mut Vec<T>, page: Vec<T>, append: bool) {
    if append {
        items.extend(page);
    } else {
        *items = page;
    }
}
