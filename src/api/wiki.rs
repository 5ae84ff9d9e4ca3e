//! Purpose: Wiki page records and the `wiki.*` endpoint family.
//! Exports: `PageInfo`, `Page`, `WikiRpc`.
//! Role: Typed wrappers over `Client` for reading and editing wiki pages.
//! Invariants: `lastModified` is always a datetime marker; anything else fails decode.
#![allow(clippy::result_large_err)]

use super::client::{ApiResult, Client};
use crate::core::class_hint;
use crate::core::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: i64,
    #[serde(with = "class_hint::datetime")]
    pub last_modified: OffsetDateTime,
    #[serde(default)]
    pub comment: String,
}

/// Latest revision of a page in both source and rendered form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page {
    pub info: PageInfo,
    pub wiki: String,
    pub html: String,
}

#[derive(Clone, Copy)]
pub struct WikiRpc<'a> {
    client: &'a Client,
}

impl<'a> WikiRpc<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetches source, rendered HTML and metadata in three sequential calls.
    pub fn page(&self, name: &str) -> ApiResult<Page> {
        let wiki = self.client.call("wiki.getPage", vec![json!(name)])?;
        let html = self.client.call("wiki.getPageHTML", vec![json!(name)])?;
        let info = self.page_info(name)?;
        Ok(Page { info, wiki, html })
    }

    pub fn page_info(&self, name: &str) -> ApiResult<PageInfo> {
        self.client.call("wiki.getPageInfo", vec![json!(name)])
    }

    pub fn pages(&self) -> ApiResult<Vec<String>> {
        self.client.names("wiki.getAllPages")
    }

    pub fn rpc_version(&self) -> ApiResult<i64> {
        self.client.call("wiki.getRPCVersionSupported", Vec::new())
    }

    /// Writes a new revision of `name`. Returns whether the server accepted it.
    pub fn put_page(&self, name: &str, content: &str, comment: &str) -> ApiResult<bool> {
        self.client.call(
            "wiki.putPage",
            vec![json!(name), json!(content), json!({"comment": comment})],
        )
    }

    pub fn delete_page(&self, name: &str) -> ApiResult<bool> {
        self.client.call("wiki.deletePage", vec![json!(name)])
    }

    pub fn wiki_to_html(&self, text: &str) -> ApiResult<String> {
        self.client.call("wiki.wikiToHtml", vec![json!(text)])
    }

    pub fn page_version(&self, name: &str, version: i64) -> ApiResult<String> {
        let _ = (name, version);
        Err(Error::unsupported("wiki.getPageVersion"))
    }

    pub fn recent_changes(&self, since: OffsetDateTime) -> ApiResult<Vec<PageInfo>> {
        let _ = since;
        Err(Error::unsupported("wiki.getRecentChanges"))
    }

    pub fn page_info_version(&self, name: &str, version: i64) -> ApiResult<PageInfo> {
        let _ = (name, version);
        Err(Error::unsupported("wiki.getPageInfoVersion"))
    }
}
