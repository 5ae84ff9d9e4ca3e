//! Purpose: Single error type shared by the codec, envelope, facade and CLI.
//! Exports: `Error`, `ErrorKind`, `RpcFault`, `to_exit_code`.
//! Role: Kind-first classification with optional builder context.
//! Invariants: Every failure surfaces unchanged to the caller; no layer retries.
//! Invariants: Remote faults keep the service's code, message and name intact.
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    Transport,
    Remote,
    Decode,
    Unsupported,
    Io,
}

/// Error object carried in a response envelope.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RpcFault {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub name: String,
}

impl RpcFault {
    pub fn is_error(&self) -> bool {
        self.code != 0
    }
}

impl fmt::Display for RpcFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}): {}", self.name, self.code, self.message)
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    method: Option<String>,
    status: Option<u16>,
    fault: Option<RpcFault>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            method: None,
            status: None,
            fault: None,
            source: None,
        }
    }

    pub fn remote(fault: RpcFault) -> Self {
        Self::new(ErrorKind::Remote)
            .with_message(fault.message.clone())
            .with_fault(fault)
    }

    pub fn unsupported(method: &str) -> Self {
        Self::new(ErrorKind::Unsupported)
            .with_message("not implemented")
            .with_method(method)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn fault(&self) -> Option<&RpcFault> {
        self.fault.as_ref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_fault(mut self, fault: RpcFault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(fault) = &self.fault {
            write!(f, " (fault: {}, code: {})", fault.name, fault.code)?;
        }
        if let Some(method) = &self.method {
            write!(f, " (method: {method})")?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {status})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::Transport => 3,
        ErrorKind::Remote => 4,
        ErrorKind::Decode => 5,
        ErrorKind::Unsupported => 6,
        ErrorKind::Io => 7,
    }
}
