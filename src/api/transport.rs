//! Purpose: The "POST bytes, receive bytes" capability beneath the RPC envelope.
//! Exports: `Transport`, `HttpPost`, `HttpReply`, `UreqTransport`.
//! Role: Seam between protocol logic and the HTTP stack; swappable in tests.
//! Invariants: Non-2xx statuses are replies, not errors; only I/O failures are errors.
//! Invariants: One request per call; no retries, pooling policy is the agent's.
#![allow(clippy::result_large_err)]

use super::client::ClientConfig;
use crate::core::error::{Error, ErrorKind};
use std::io::Read;
use url::Url;

#[derive(Clone, Copy, Debug)]
pub struct HttpPost<'a> {
    pub url: &'a Url,
    pub content_type: &'a str,
    pub authorization: Option<&'a str>,
    pub body: &'a [u8],
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport: Send + Sync {
    fn post(&self, request: &HttpPost<'_>) -> Result<HttpReply, Error>;
}

#[derive(Clone, Debug)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn from_config(config: &ClientConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build();
        Self { agent }
    }

    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn post(&self, request: &HttpPost<'_>) -> Result<HttpReply, Error> {
        let mut call = self
            .agent
            .post(request.url.as_str())
            .set("Content-Type", request.content_type)
            .set("Accept", "application/json");
        if let Some(authorization) = request.authorization {
            call = call.set("Authorization", authorization);
        }
        match call.send_bytes(request.body) {
            Ok(resp) => read_reply(resp),
            Err(ureq::Error::Status(_, resp)) => read_reply(resp),
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Transport)
                .with_message("request failed")
                .with_source(err)),
        }
    }
}

fn read_reply(response: ureq::Response) -> Result<HttpReply, Error> {
    let status = response.status();
    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|err| {
            Error::new(ErrorKind::Transport)
                .with_message("failed to read response body")
                .with_status(status)
                .with_source(err)
        })?;
    Ok(HttpReply { status, body })
}
