// src/models/pagination.rs

use axum::http::Uri;
use serde::{Deserialize, Serialize};

use crate::config::MAX_PAGE_SIZE;

/// `?limit=&offset=` query parameters shared by every list endpoint.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageParams {
    /// Returns `(limit, offset)` clamped to sane bounds.
    pub fn resolve(&self, default_limit: i64) -> (i64, i64) {
        let limit = self.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// Paginated list response body.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wraps one page of `results`. Links reuse the request path and keep every
    /// other query parameter.
    pub fn new(results: Vec<T>, count: i64, limit: i64, offset: i64, uri: &Uri) -> Self {
        let next = (offset + limit < count).then(|| page_link(uri, limit, offset + limit));
        let previous = (offset > 0).then(|| page_link(uri, limit, (offset - limit).max(0)));

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

fn page_link(uri: &Uri, limit: i64, offset: i64) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(raw) = uri.query() {
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            if key != "limit" && key != "offset" {
                query.append_pair(&key, &value);
            }
        }
    }
    query.append_pair("limit", &limit.to_string());
    query.append_pair("offset", &offset.to_string());

    format!("{}?{}", uri.path(), query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_clamps_limit_and_offset() {
        let params = PageParams {
            limit: Some(1000),
            offset: Some(-5),
        };
        assert_eq!(params.resolve(10), (MAX_PAGE_SIZE, 0));
        assert_eq!(PageParams::default().resolve(10), (10, 0));
    }

    #[test]
    fn first_page_links_forward_only() {
        let uri: Uri = "/api/v1/titles/?genre=sci-fi".parse().unwrap();
        let page = Page::new(vec![1, 2], 5, 2, 0, &uri);

        assert_eq!(
            page.next.as_deref(),
            Some("/api/v1/titles/?genre=sci-fi&limit=2&offset=2")
        );
        assert!(page.previous.is_none());
    }

    #[test]
    fn last_page_links_backward_only() {
        let uri: Uri = "/api/v1/genres/?limit=2&offset=4".parse().unwrap();
        let page = Page::new(vec![5], 5, 2, 4, &uri);

        assert!(page.next.is_none());
        assert_eq!(page.previous.as_deref(), Some("/api/v1/genres/?limit=2&offset=2"));
    }
}
