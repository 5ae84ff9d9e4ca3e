//! Purpose: Request and response envelopes of the JSON-RPC wire protocol.
//! Exports: `RemoteCall`, `RemoteResponse`.
//! Role: Serialization boundary between the client and the byte transport.
//! Invariants: Requests always carry a `params` array, possibly empty.
//! Invariants: `result` stays undecoded until the caller names a target type.
use crate::core::error::{Error, ErrorKind, RpcFault};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RemoteCall {
    pub method: String,
    pub params: Vec<Value>,
}

impl RemoteCall {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode request json")
                .with_method(self.method.clone())
                .with_source(err)
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RemoteResponse {
    #[serde(default)]
    pub error: Option<RpcFault>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub result: Value,
}

impl RemoteResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(body).map_err(|err| {
            Error::new(ErrorKind::Transport)
                .with_message("invalid response envelope")
                .with_source(err)
        })
    }

    /// The fault carried by this envelope, if it signals failure.
    pub fn fault(&self) -> Option<&RpcFault> {
        self.error.as_ref().filter(|fault| fault.is_error())
    }

    pub fn into_result(self) -> Result<Value, Error> {
        match self.error {
            Some(fault) if fault.is_error() => Err(Error::remote(fault)),
            _ => Ok(self.result),
        }
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, Error> {
        let result = self.into_result()?;
        serde_json::from_value(result).map_err(|err| {
            Error::new(ErrorKind::Decode)
                .with_message("unexpected result shape")
                .with_source(err)
        })
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(id) => Some(id),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    })
}
