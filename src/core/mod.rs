//! Purpose: Protocol core (errors, class-hint codec, record decoder, envelopes).
//! Exports: Submodules only; the public surface is re-exported through `api`.
//! Invariants: No I/O happens in `core`; transports live in `api`.
pub mod class_hint;
pub mod envelope;
pub mod error;
pub mod record;
