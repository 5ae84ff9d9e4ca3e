//! Purpose: Encode and decode class-hint markers for values JSON cannot carry natively.
//! Exports: `ClassHint`, marker helpers, and serde adapters `datetime` / `option_datetime`.
//! Role: The only path by which datetimes and binary blobs cross the wire.
//! Invariants: Markers are `{"__jsonclass__": [tag, payload]}`; lookup is by key, never by position.
//! Invariants: Datetimes are UTC, `YYYY-MM-DDTHH:MM:SS`, no zone suffix, whole seconds only.
//! Invariants: Unknown tags are rejected rather than skipped.
use crate::core::error::{Error, ErrorKind};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub const CLASS_KEY: &str = "__jsonclass__";
pub const DATETIME_TAG: &str = "datetime";
pub const BINARY_TAG: &str = "binary";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClassHint {
    DateTime(OffsetDateTime),
    Binary(Vec<u8>),
}

impl ClassHint {
    pub fn tag(&self) -> &'static str {
        match self {
            ClassHint::DateTime(_) => DATETIME_TAG,
            ClassHint::Binary(_) => BINARY_TAG,
        }
    }

    pub fn to_value(&self) -> Value {
        let payload = match self {
            ClassHint::DateTime(value) => format_datetime(*value),
            ClassHint::Binary(bytes) => STANDARD.encode(bytes),
        };
        marker(self.tag(), payload)
    }

    pub fn from_value(value: &Value) -> Result<Self, Error> {
        let (tag, payload) = split_marker(value)?;
        match tag {
            DATETIME_TAG => parse_datetime(payload).map(ClassHint::DateTime),
            BINARY_TAG => decode_base64(payload).map(ClassHint::Binary),
            other => Err(Error::new(ErrorKind::Decode)
                .with_message(format!("unrecognized class hint tag {other:?}"))),
        }
    }
}

pub fn is_marker(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.contains_key(CLASS_KEY))
}

pub fn encode_datetime(value: OffsetDateTime) -> Value {
    ClassHint::DateTime(value).to_value()
}

pub fn encode_binary(bytes: &[u8]) -> Value {
    marker(BINARY_TAG, STANDARD.encode(bytes))
}

pub fn decode_datetime(value: &Value) -> Result<OffsetDateTime, Error> {
    match ClassHint::from_value(value)? {
        ClassHint::DateTime(value) => Ok(value),
        other => Err(kind_mismatch(DATETIME_TAG, other.tag())),
    }
}

pub fn decode_binary(value: &Value) -> Result<Vec<u8>, Error> {
    match ClassHint::from_value(value)? {
        ClassHint::Binary(bytes) => Ok(bytes),
        other => Err(kind_mismatch(BINARY_TAG, other.tag())),
    }
}

/// Like `decode_datetime`, but `0`, `false` and `null` mean unset.
pub fn decode_optional_datetime(value: &Value) -> Result<Option<OffsetDateTime>, Error> {
    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Number(number) if number.as_i64() == Some(0) => Ok(None),
        _ => decode_datetime(value).map(Some),
    }
}

/// Formats in UTC; sub-second precision is dropped, not rounded.
pub fn format_datetime(value: OffsetDateTime) -> String {
    let utc = value.to_offset(UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        utc.year(),
        u8::from(utc.month()),
        utc.day(),
        utc.hour(),
        utc.minute(),
        utc.second()
    )
}

pub fn parse_datetime(raw: &str) -> Result<OffsetDateTime, Error> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(raw, format)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|err| {
            Error::new(ErrorKind::Decode)
                .with_message(format!("invalid datetime {raw:?}"))
                .with_source(err)
        })
}

fn decode_base64(raw: &str) -> Result<Vec<u8>, Error> {
    // Some servers wrap long payloads MIME-style.
    let compact: String = raw.chars().filter(|ch| *ch != '\n' && *ch != '\r').collect();
    STANDARD.decode(compact.as_bytes()).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message("invalid base64 in binary class hint")
            .with_source(err)
    })
}

fn marker(tag: &str, payload: String) -> Value {
    let mut map = Map::new();
    map.insert(
        CLASS_KEY.to_string(),
        Value::Array(vec![Value::String(tag.to_string()), Value::String(payload)]),
    );
    Value::Object(map)
}

fn split_marker(value: &Value) -> Result<(&str, &str), Error> {
    let pair = value
        .as_object()
        .and_then(|map| map.get(CLASS_KEY))
        .ok_or_else(|| Error::new(ErrorKind::Decode).with_message("expected class hint object"))?;
    match pair.as_array().map(Vec::as_slice) {
        Some([Value::String(tag), Value::String(payload)]) => Ok((tag.as_str(), payload.as_str())),
        _ => Err(Error::new(ErrorKind::Decode)
            .with_message("class hint must be a [tag, value] pair of strings")),
    }
}

fn kind_mismatch(expected: &str, found: &str) -> Error {
    Error::new(ErrorKind::Decode)
        .with_message(format!("expected {expected} class hint, found {found}"))
}

/// Serde adapter for fields that are always a datetime marker on the wire.
pub mod datetime {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;
    use time::OffsetDateTime;

    pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        super::encode_datetime(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        let value = Value::deserialize(deserializer)?;
        super::decode_datetime(&value).map_err(D::Error::custom)
    }
}

/// Serde adapter for optional datetimes; the wire uses `0` (or null/false) for unset.
pub mod option_datetime {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;
    use time::OffsetDateTime;

    pub fn serialize<S: Serializer>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::encode_datetime(*value).serialize(serializer),
            None => serializer.serialize_i64(0),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        super::decode_optional_datetime(&value).map_err(D::Error::custom)
    }
}
