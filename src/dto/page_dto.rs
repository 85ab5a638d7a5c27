use axum::{response::IntoResponse, response::Response, Json};
use serde::{Deserialize, Serialize};

use crate::services::record_view::{paginate, DEFAULT_PAGE_SIZE};

/// Optional paging for the simple list endpoints. Without `page` the whole
/// list is returned as a bare array.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<String>,
    #[serde(alias = "limit")]
    pub per_page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> Option<usize> {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .map(|p| p.max(1))
    }

    pub fn per_page(&self) -> usize {
        self.per_page
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn respond<T: Serialize>(&self, items: Vec<T>) -> Response {
        match self.page() {
            Some(page) => Json(paginate(items, page, self.per_page())).into_response(),
            None => Json(items).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_fifteen_per_page() {
        let q = PageQuery {
            page: Some("2".into()),
            per_page: None,
        };
        assert_eq!(q.page(), Some(2));
        assert_eq!(q.per_page(), 15);
        assert_eq!(PageQuery::default().page(), None);
    }

    #[test]
    fn page_zero_is_first_page() {
        let q = PageQuery {
            page: Some("0".into()),
            per_page: Some("5".into()),
        };
        assert_eq!(q.page(), Some(1));
        assert_eq!(q.per_page(), 5);
    }

    #[test]
    fn max_page_reads_past_the_end() {
        let q = PageQuery {
            page: Some(u64::MAX.to_string()),
            per_page: Some(u64::MAX.to_string()),
        };
        let page = q.page().unwrap();
        let out = paginate(vec!["a", "b"], page, q.per_page());
        assert!(out.data.is_empty());
        assert_eq!(out.total_items, 2);
    }
}
