//! Purpose: JSON renderers for the records the CLI prints.
//! Exports: `ticket_json`, `attachment_json`, `field_info_json`, `page_info_json`,
//! `page_json`, `api_version_json`.
//! Role: Keep CLI output shape stable and independent of the wire encoding.
//! Invariants: Datetimes render as RFC 3339 strings; unset values render as null.
//! Invariants: Empty ticket attributes are omitted.

use serde_json::{Map, Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracrpc::api::{ApiVersion, Attachment, Page, PageInfo, Ticket, TicketAttr, TicketFieldInfo};

pub(crate) fn time_json(value: Option<OffsetDateTime>) -> Value {
    value
        .and_then(|value| value.format(&Rfc3339).ok())
        .map(Value::String)
        .unwrap_or(Value::Null)
}

pub(crate) fn ticket_json(ticket: &Ticket) -> Value {
    let mut map = Map::new();
    map.insert("id".to_string(), json!(ticket.id));
    map.insert("time".to_string(), time_json(ticket.time));
    map.insert("changetime".to_string(), time_json(ticket.changetime));
    for attr in TicketAttr::ALL {
        if let Some(text) = ticket.text(attr).filter(|text| !text.is_empty()) {
            map.insert(attr.wire_name().to_string(), json!(text));
        }
    }
    Value::Object(map)
}

pub(crate) fn attachment_json(attachment: &Attachment) -> Value {
    json!({
        "filename": attachment.filename,
        "description": attachment.description,
        "size": attachment.size,
        "time": time_json(attachment.time),
        "author": attachment.author,
    })
}

pub(crate) fn field_info_json(field: &TicketFieldInfo) -> Value {
    let mut map = Map::new();
    map.insert("name".to_string(), json!(field.name));
    map.insert("label".to_string(), json!(field.label));
    map.insert("type".to_string(), json!(field.field_type));
    if !field.value.is_empty() {
        map.insert("default".to_string(), json!(field.value));
    }
    if !field.options.is_empty() {
        map.insert("options".to_string(), json!(field.options));
    }
    map.insert("custom".to_string(), json!(field.custom));
    map.insert("optional".to_string(), json!(field.optional));
    Value::Object(map)
}

pub(crate) fn page_info_json(info: &PageInfo) -> Value {
    json!({
        "name": info.name,
        "author": info.author,
        "version": info.version,
        "last_modified": time_json(Some(info.last_modified)),
        "comment": info.comment,
    })
}

pub(crate) fn page_json(page: &Page) -> Value {
    json!({
        "info": page_info_json(&page.info),
        "wiki": page.wiki,
        "html": page.html,
    })
}

pub(crate) fn api_version_json(version: ApiVersion) -> Value {
    json!({
        "epoch": version.epoch,
        "major": version.major,
        "minor": version.minor,
    })
}
