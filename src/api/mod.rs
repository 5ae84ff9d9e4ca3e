//! Purpose: Define the public Rust API for talking to a Trac JSON-RPC endpoint.
//! Exports: `Client`, per-family facades, domain records, and the error type.
//! Role: Public, additive-only surface; codec internals stay under `core`.
//! Invariants: Every endpoint is reached through a facade borrowed from `Client`.
//! Invariants: All fallible operations return `ApiResult<T>`.

mod client;
mod search;
mod system;
mod ticket;
mod transport;
mod wiki;

pub use crate::core::class_hint::{self, ClassHint};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind, RpcFault};
pub use client::{ApiResult, Client, ClientConfig};
pub use search::SearchRpc;
pub use system::{ApiVersion, SystemRpc};
pub use ticket::{
    Attachment, Component, Milestone, Ticket, TicketAttr, TicketEnum, TicketFieldInfo, TicketRpc,
    Version,
};
pub use transport::{HttpPost, HttpReply, Transport, UreqTransport};
pub use wiki::{Page, PageInfo, WikiRpc};
