//! Purpose: Library crate behind the `tracrpc` CLI: a blocking Trac JSON-RPC client.
//! Exports: `api` (client, facades, records, errors) and `core` (wire codec).
//! Role: `api` is the stable surface; `core` is public for advanced decoding.
//! Invariants: No process-wide state; every call goes through an explicit `Client`.
pub mod api;
pub mod core;
