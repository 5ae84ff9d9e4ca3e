//! Purpose: Introspection of the RPC service (`system.*`).
//! Exports: `ApiVersion`, `SystemRpc`.
//! Role: API version and method discovery for clients and the CLI.
#![allow(clippy::result_large_err)]

use super::client::{ApiResult, Client};
use crate::core::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Plugin API version. `epoch` is 0 for Trac 0.10 and 1 for 0.11 or later.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i64, i64, i64)")]
pub struct ApiVersion {
    pub epoch: i64,
    pub major: i64,
    pub minor: i64,
}

impl From<(i64, i64, i64)> for ApiVersion {
    fn from((epoch, major, minor): (i64, i64, i64)) -> Self {
        Self {
            epoch,
            major,
            minor,
        }
    }
}

#[derive(Clone, Copy)]
pub struct SystemRpc<'a> {
    client: &'a Client,
}

impl<'a> SystemRpc<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn api_version(&self) -> ApiResult<ApiVersion> {
        self.client.call("system.getAPIVersion", Vec::new())
    }

    /// Every non-system method the server exposes.
    pub fn methods(&self) -> ApiResult<Vec<String>> {
        self.client.names("system.listMethods")
    }

    /// Documentation for one method; may contain HTML, empty when none exists.
    pub fn method_help(&self, method: &str) -> ApiResult<String> {
        self.client.call("system.methodHelp", vec![json!(method)])
    }

    pub fn method_signature(&self, method: &str) -> ApiResult<Vec<String>> {
        let _ = method;
        Err(Error::unsupported("system.methodSignature"))
    }
}
