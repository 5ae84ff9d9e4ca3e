//! Purpose: Populate typed records from `[id, {field: value, ...}]` wire arrays.
//! Exports: `WireRecord`, `FieldValue`, `decode_record`, `expect_text`, `expect_time`.
//! Role: Replaces runtime field reflection with a per-record dispatch table.
//! Invariants: The first array element is the integer identifier.
//! Invariants: Unknown field names are ignored; type mismatches on known fields fail.
//! Invariants: A failed decode never returns a partially populated record.
use crate::core::class_hint::{self, ClassHint};
use crate::core::error::{Error, ErrorKind};
use serde_json::Value;
use time::OffsetDateTime;

/// A field value after class-hint resolution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldValue {
    Text(String),
    Time(OffsetDateTime),
    Bytes(Vec<u8>),
}

impl FieldValue {
    fn describe(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Time(_) => "datetime",
            FieldValue::Bytes(_) => "binary",
        }
    }
}

pub trait WireRecord: Default {
    fn set_id(&mut self, id: i64);

    /// Assigns a named field, matching the name case-insensitively.
    /// Returns `Ok(false)` when the record has no such field.
    fn assign(&mut self, name: &str, value: FieldValue) -> Result<bool, Error>;

    /// Receives a bare datetime marker found at `slot` (0-based, after the id).
    fn assign_positional_time(&mut self, slot: usize, value: OffsetDateTime) {
        let _ = (slot, value);
    }
}

pub fn decode_record<R: WireRecord>(raw: &Value) -> Result<R, Error> {
    let items = raw
        .as_array()
        .ok_or_else(|| Error::new(ErrorKind::Decode).with_message("record must be a json array"))?;
    let (first, rest) = items
        .split_first()
        .ok_or_else(|| Error::new(ErrorKind::Decode).with_message("record array is empty"))?;
    let id = record_id(first)?;

    let mut record = R::default();
    record.set_id(id);
    for (slot, item) in rest.iter().enumerate() {
        let Value::Object(fields) = item else {
            continue;
        };
        if class_hint::is_marker(item) {
            record.assign_positional_time(slot, class_hint::decode_datetime(item)?);
            continue;
        }
        for (name, value) in fields {
            let Some(value) = field_value(value)? else {
                continue;
            };
            record.assign(name, value)?;
        }
    }
    Ok(record)
}

pub fn expect_text(name: &str, value: FieldValue) -> Result<String, Error> {
    match value {
        FieldValue::Text(text) => Ok(text),
        other => Err(mismatch(name, "text", &other)),
    }
}

pub fn expect_time(name: &str, value: FieldValue) -> Result<OffsetDateTime, Error> {
    match value {
        FieldValue::Time(time) => Ok(time),
        other => Err(mismatch(name, "datetime", &other)),
    }
}

fn record_id(value: &Value) -> Result<i64, Error> {
    if let Some(id) = value.as_i64() {
        return Ok(id);
    }
    match value.as_f64() {
        Some(id) if id.fract() == 0.0 && id.abs() < i64::MAX as f64 => Ok(id as i64),
        _ => Err(Error::new(ErrorKind::Decode)
            .with_message("record identifier must be an integer")),
    }
}

fn field_value(value: &Value) -> Result<Option<FieldValue>, Error> {
    let value = match value {
        Value::String(text) => FieldValue::Text(text.clone()),
        Value::Number(number) => FieldValue::Text(number.to_string()),
        Value::Bool(flag) => FieldValue::Text(flag.to_string()),
        Value::Object(_) if !class_hint::is_marker(value) => return Ok(None),
        Value::Object(_) => match ClassHint::from_value(value)? {
            ClassHint::DateTime(time) => FieldValue::Time(time),
            ClassHint::Binary(bytes) => FieldValue::Bytes(bytes),
        },
        Value::Null | Value::Array(_) => return Ok(None),
    };
    Ok(Some(value))
}

fn mismatch(name: &str, expected: &str, found: &FieldValue) -> Error {
    Error::new(ErrorKind::Decode).with_message(format!(
        "field {name:?} expects {expected}, found {}",
        found.describe()
    ))
}
