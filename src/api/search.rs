//! Purpose: Full-text search endpoints (`search.*`).
//! Exports: `SearchRpc`.
//! Role: Reserved surface; both operations report `Unsupported` without a request.
#![allow(clippy::result_large_err)]

use super::client::{ApiResult, Client};
use crate::core::error::Error;

#[derive(Clone, Copy)]
pub struct SearchRpc<'a> {
    #[allow(dead_code)]
    client: &'a Client,
}

impl<'a> SearchRpc<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Filters as `(name, description)` pairs.
    pub fn filters(&self) -> ApiResult<Vec<(String, String)>> {
        Err(Error::unsupported("search.getSearchFilters"))
    }

    /// Results as `(href, title, date, author, excerpt)`; all filters when `filters` is empty.
    pub fn search(&self, query: &str, filters: &[&str]) -> ApiResult<Vec<serde_json::Value>> {
        let _ = (query, filters);
        Err(Error::unsupported("search.performSearch"))
    }
}
