//! Purpose: Blocking JSON-RPC client for a Trac `login/jsonrpc` endpoint.
//! Exports: `Client`, `ClientConfig`, `ApiResult`.
//! Role: Owns the endpoint and transport; issues one round trip per call.
//! Invariants: Faults in the response envelope win over both result and HTTP status.
//! Invariants: Credentials embedded in the endpoint URL become an Authorization header
//! and never appear in the stored endpoint, logs, or errors.
//! Invariants: No per-call state lives on the client; clones share one transport.
#![allow(clippy::result_large_err)]

use super::search::SearchRpc;
use super::system::SystemRpc;
use super::ticket::TicketRpc;
use super::transport::{HttpPost, Transport, UreqTransport};
use super::wiki::WikiRpc;
use crate::core::envelope::{RemoteCall, RemoteResponse};
use crate::core::error::{Error, ErrorKind};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub type ApiResult<T> = Result<T, Error>;

const CONTENT_TYPE: &str = "application/json";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    endpoint: String,
    timeout: Duration,
    user_agent: String,
}

impl ClientConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            user_agent: concat!("tracrpc/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    endpoint: Url,
    authorization: Option<String>,
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("authenticated", &self.inner.authorization.is_some())
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(endpoint: impl Into<String>) -> ApiResult<Self> {
        Self::with_config(ClientConfig::new(endpoint))
    }

    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        let transport = UreqTransport::from_config(&config);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: impl Transport + 'static,
    ) -> ApiResult<Self> {
        let (endpoint, authorization) = split_credentials(config.endpoint())?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                endpoint,
                authorization,
                transport: Box::new(transport),
            }),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    pub fn search(&self) -> SearchRpc<'_> {
        SearchRpc::new(self)
    }

    pub fn system(&self) -> SystemRpc<'_> {
        SystemRpc::new(self)
    }

    pub fn ticket(&self) -> TicketRpc<'_> {
        TicketRpc::new(self)
    }

    pub fn wiki(&self) -> WikiRpc<'_> {
        WikiRpc::new(self)
    }

    /// Sends one call and returns the envelope with its result still undecoded.
    pub fn send(&self, method: &str, params: Vec<Value>) -> ApiResult<RemoteResponse> {
        let call = RemoteCall::new(method, params);
        let body = call.to_bytes()?;
        debug!(
            method,
            endpoint = %self.inner.endpoint,
            params = call.params.len(),
            "sending rpc call"
        );

        let request = HttpPost {
            url: &self.inner.endpoint,
            content_type: CONTENT_TYPE,
            authorization: self.inner.authorization.as_deref(),
            body: &body,
        };
        let reply = self
            .inner
            .transport
            .post(&request)
            .map_err(|err| err.with_method(method))?;
        debug!(
            method,
            status = reply.status,
            bytes = reply.body.len(),
            "received rpc reply"
        );

        let success = reply.is_success();
        let response = match RemoteResponse::from_slice(&reply.body) {
            Ok(response) => response,
            Err(err) if success => return Err(err.with_method(method)),
            Err(_) => return Err(status_error(method, reply.status)),
        };
        if let Some(fault) = response.fault() {
            warn!(
                method,
                code = fault.code,
                name = %fault.name,
                "rpc call returned a fault"
            );
            let mut err = Error::remote(fault.clone()).with_method(method);
            if !success {
                err = err.with_status(reply.status);
            }
            return Err(err);
        }
        if !success {
            return Err(status_error(method, reply.status));
        }
        Ok(response)
    }

    /// Sends one call and deserializes its result into `T`.
    pub fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> ApiResult<T> {
        self.send(method, params)?
            .decode()
            .map_err(|err| err.with_method(method))
    }

    pub fn call_value(&self, method: &str, params: Vec<Value>) -> ApiResult<Value> {
        self.send(method, params)?.into_result()
    }

    /// For `*.getAll`-style endpoints that return a list of names.
    pub fn names(&self, method: &str) -> ApiResult<Vec<String>> {
        self.call(method, Vec::new())
    }
}

fn status_error(method: &str, status: u16) -> Error {
    let err = Error::new(ErrorKind::Transport)
        .with_message(format!("unexpected http status {status}"))
        .with_status(status)
        .with_method(method);
    match status {
        401 | 403 => err.with_hint("Check the credentials embedded in the endpoint URL."),
        404 => err.with_hint("Trac serves JSON-RPC at <project>/login/jsonrpc or <project>/jsonrpc."),
        _ => err,
    }
}

fn split_credentials(raw: &str) -> ApiResult<(Url, Option<String>)> {
    let mut url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid endpoint url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("endpoint url must use http or https scheme"));
    }

    let username = percent_decode_str(url.username()).decode_utf8_lossy().into_owned();
    let password = url
        .password()
        .map(|password| percent_decode_str(password).decode_utf8_lossy().into_owned());
    if username.is_empty() && password.is_none() {
        return Ok((url, None));
    }

    let credentials = format!("{username}:{}", password.unwrap_or_default());
    let authorization = format!("Basic {}", STANDARD.encode(credentials));
    url.set_username("")
        .and_then(|()| url.set_password(None))
        .map_err(|()| {
            Error::new(ErrorKind::Usage).with_message("endpoint url cannot carry credentials")
        })?;
    Ok((url, Some(authorization)))
}
