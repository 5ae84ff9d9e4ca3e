//! Purpose: Ticket records and the `ticket.*` endpoint family.
//! Exports: `Ticket`, `TicketAttr`, `TicketFieldInfo`, `Attachment`, `Component`,
//! `Milestone`, `Version`, `TicketEnum`, `TicketRpc`.
//! Role: Typed wrappers that build params, delegate to `Client`, and decode results.
//! Invariants: Ticket ids are sent in their string form, as the service expects.
//! Invariants: Ticket attribute names resolve through `TicketAttr`, never by reflection.
#![allow(clippy::result_large_err)]

use super::client::{ApiResult, Client};
use crate::core::class_hint;
use crate::core::error::{Error, ErrorKind};
use crate::core::record::{self, FieldValue, WireRecord};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};
use time::OffsetDateTime;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ticket {
    pub id: i64,
    pub time: Option<OffsetDateTime>,
    pub changetime: Option<OffsetDateTime>,
    pub owner: String,
    pub reporter: String,
    pub summary: String,
    pub description: String,
    pub project: String,
    pub status: String,
    pub kind: String,
    pub priority: String,
    pub milestone: String,
    pub component: String,
    pub blocked_by: String,
    pub blocking: String,
    pub keywords: String,
    pub parents: String,
    pub resolution: String,
    pub version: String,
    pub cc: String,
    pub severity: String,
}

/// Every ticket attribute the decoder knows, keyed by its wire name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TicketAttr {
    Time,
    Changetime,
    Owner,
    Reporter,
    Summary,
    Description,
    Project,
    Status,
    Type,
    Priority,
    Milestone,
    Component,
    BlockedBy,
    Blocking,
    Keywords,
    Parents,
    Resolution,
    Version,
    Cc,
    Severity,
}

enum Slot<'a> {
    Text(&'a mut String),
    Time(&'a mut Option<OffsetDateTime>),
}

impl TicketAttr {
    pub const ALL: [TicketAttr; 20] = [
        TicketAttr::Time,
        TicketAttr::Changetime,
        TicketAttr::Owner,
        TicketAttr::Reporter,
        TicketAttr::Summary,
        TicketAttr::Description,
        TicketAttr::Project,
        TicketAttr::Status,
        TicketAttr::Type,
        TicketAttr::Priority,
        TicketAttr::Milestone,
        TicketAttr::Component,
        TicketAttr::BlockedBy,
        TicketAttr::Blocking,
        TicketAttr::Keywords,
        TicketAttr::Parents,
        TicketAttr::Resolution,
        TicketAttr::Version,
        TicketAttr::Cc,
        TicketAttr::Severity,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            TicketAttr::Time => "time",
            TicketAttr::Changetime => "changetime",
            TicketAttr::Owner => "owner",
            TicketAttr::Reporter => "reporter",
            TicketAttr::Summary => "summary",
            TicketAttr::Description => "description",
            TicketAttr::Project => "project",
            TicketAttr::Status => "status",
            TicketAttr::Type => "type",
            TicketAttr::Priority => "priority",
            TicketAttr::Milestone => "milestone",
            TicketAttr::Component => "component",
            TicketAttr::BlockedBy => "blockedby",
            TicketAttr::Blocking => "blocking",
            TicketAttr::Keywords => "keywords",
            TicketAttr::Parents => "parents",
            TicketAttr::Resolution => "resolution",
            TicketAttr::Version => "version",
            TicketAttr::Cc => "cc",
            TicketAttr::Severity => "severity",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.wire_name().eq_ignore_ascii_case(name))
    }
}

impl Ticket {
    pub fn from_wire(raw: &Value) -> ApiResult<Self> {
        record::decode_record(raw)
    }

    pub fn text(&self, attr: TicketAttr) -> Option<&str> {
        let text = match attr {
            TicketAttr::Time | TicketAttr::Changetime => return None,
            TicketAttr::Owner => &self.owner,
            TicketAttr::Reporter => &self.reporter,
            TicketAttr::Summary => &self.summary,
            TicketAttr::Description => &self.description,
            TicketAttr::Project => &self.project,
            TicketAttr::Status => &self.status,
            TicketAttr::Type => &self.kind,
            TicketAttr::Priority => &self.priority,
            TicketAttr::Milestone => &self.milestone,
            TicketAttr::Component => &self.component,
            TicketAttr::BlockedBy => &self.blocked_by,
            TicketAttr::Blocking => &self.blocking,
            TicketAttr::Keywords => &self.keywords,
            TicketAttr::Parents => &self.parents,
            TicketAttr::Resolution => &self.resolution,
            TicketAttr::Version => &self.version,
            TicketAttr::Cc => &self.cc,
            TicketAttr::Severity => &self.severity,
        };
        Some(text.as_str())
    }

    /// Attribute map for `ticket.create`: set values only, minus id, summary and description.
    pub fn attributes(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        for attr in TicketAttr::ALL {
            if matches!(attr, TicketAttr::Summary | TicketAttr::Description) {
                continue;
            }
            let value = match attr {
                TicketAttr::Time => self.time.map(class_hint::encode_datetime),
                TicketAttr::Changetime => self.changetime.map(class_hint::encode_datetime),
                _ => self
                    .text(attr)
                    .filter(|text| !text.is_empty())
                    .map(|text| Value::String(text.to_string())),
            };
            if let Some(value) = value {
                attrs.insert(attr.wire_name().to_string(), value);
            }
        }
        attrs
    }

    fn slot_mut(&mut self, attr: TicketAttr) -> Slot<'_> {
        match attr {
            TicketAttr::Time => Slot::Time(&mut self.time),
            TicketAttr::Changetime => Slot::Time(&mut self.changetime),
            TicketAttr::Owner => Slot::Text(&mut self.owner),
            TicketAttr::Reporter => Slot::Text(&mut self.reporter),
            TicketAttr::Summary => Slot::Text(&mut self.summary),
            TicketAttr::Description => Slot::Text(&mut self.description),
            TicketAttr::Project => Slot::Text(&mut self.project),
            TicketAttr::Status => Slot::Text(&mut self.status),
            TicketAttr::Type => Slot::Text(&mut self.kind),
            TicketAttr::Priority => Slot::Text(&mut self.priority),
            TicketAttr::Milestone => Slot::Text(&mut self.milestone),
            TicketAttr::Component => Slot::Text(&mut self.component),
            TicketAttr::BlockedBy => Slot::Text(&mut self.blocked_by),
            TicketAttr::Blocking => Slot::Text(&mut self.blocking),
            TicketAttr::Keywords => Slot::Text(&mut self.keywords),
            TicketAttr::Parents => Slot::Text(&mut self.parents),
            TicketAttr::Resolution => Slot::Text(&mut self.resolution),
            TicketAttr::Version => Slot::Text(&mut self.version),
            TicketAttr::Cc => Slot::Text(&mut self.cc),
            TicketAttr::Severity => Slot::Text(&mut self.severity),
        }
    }
}

impl WireRecord for Ticket {
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn assign(&mut self, name: &str, value: FieldValue) -> Result<bool, Error> {
        let Some(attr) = TicketAttr::from_wire(name) else {
            return Ok(false);
        };
        match self.slot_mut(attr) {
            Slot::Text(slot) => *slot = record::expect_text(name, value)?,
            Slot::Time(slot) => *slot = Some(record::expect_time(name, value)?),
        }
        Ok(true)
    }

    // ticket.get returns [id, time_created, time_changed, attributes].
    fn assign_positional_time(&mut self, slot: usize, value: OffsetDateTime) {
        match slot {
            0 => self.time = Some(value),
            1 => self.changetime = Some(value),
            _ => {}
        }
    }
}

/// Field metadata as returned by `ticket.getTicketFields`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct TicketFieldInfo {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub value: String,
    pub format: String,
    pub options: Vec<String>,
    pub order: i64,
    pub custom: bool,
    pub optional: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub description: String,
    pub size: u64,
    pub time: Option<OffsetDateTime>,
    pub author: String,
    /// Empty unless fetched with `TicketRpc::fetch_attachment`.
    pub content: Vec<u8>,
}

impl<'de> Deserialize<'de> for Attachment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (filename, description, size, time, author): (String, String, u64, Value, String) =
            Deserialize::deserialize(deserializer)?;
        let time = class_hint::decode_optional_datetime(&time).map_err(D::Error::custom)?;
        Ok(Self {
            filename,
            description,
            size,
            time,
            author,
            content: Vec::new(),
        })
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    pub name: String,
    pub owner: String,
    pub description: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Milestone {
    pub name: String,
    pub description: String,
    #[serde(with = "class_hint::option_datetime")]
    pub due: Option<OffsetDateTime>,
    #[serde(with = "class_hint::option_datetime")]
    pub completed: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    pub name: String,
    pub description: String,
    #[serde(with = "class_hint::option_datetime")]
    pub time: Option<OffsetDateTime>,
}

/// Value enumerations that share the `getAll/get/create/update/delete` shape.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TicketEnum {
    Priority,
    Resolution,
    Severity,
    Type,
}

impl TicketEnum {
    fn namespace(self) -> &'static str {
        match self {
            TicketEnum::Priority => "ticket.priority",
            TicketEnum::Resolution => "ticket.resolution",
            TicketEnum::Severity => "ticket.severity",
            TicketEnum::Type => "ticket.type",
        }
    }

    fn method(self, verb: &str) -> String {
        format!("{}.{verb}", self.namespace())
    }
}

#[derive(Clone, Copy)]
pub struct TicketRpc<'a> {
    client: &'a Client,
}

impl<'a> TicketRpc<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn open_ids(&self) -> ApiResult<Vec<i64>> {
        self.query("max=0&status!=closed")
    }

    /// Runs a ticket query; paging follows the server's stored settings.
    pub fn query(&self, query: &str) -> ApiResult<Vec<i64>> {
        self.client.call("ticket.query", vec![json!(query)])
    }

    pub fn get(&self, id: i64) -> ApiResult<Ticket> {
        let raw = self
            .client
            .call_value("ticket.get", vec![ticket_id(id)])?;
        Ticket::from_wire(&raw).map_err(|err| err.with_method("ticket.get"))
    }

    /// Creates a ticket and returns its id. Overriding `time` needs admin permission.
    pub fn create(&self, ticket: &Ticket) -> ApiResult<i64> {
        self.client.call(
            "ticket.create",
            vec![
                json!(ticket.summary),
                json!(ticket.description),
                Value::Object(ticket.attributes()),
            ],
        )
    }

    pub fn delete(&self, id: i64) -> ApiResult<i64> {
        self.client.call("ticket.delete", vec![ticket_id(id)])
    }

    pub fn fields(&self) -> ApiResult<Vec<TicketFieldInfo>> {
        self.client.call("ticket.getTicketFields", Vec::new())
    }

    pub fn attachments(&self, id: i64) -> ApiResult<Vec<Attachment>> {
        self.client
            .call("ticket.listAttachments", vec![ticket_id(id)])
    }

    pub fn attachment(&self, id: i64, filename: &str) -> ApiResult<Vec<u8>> {
        let raw = self
            .client
            .call_value("ticket.getAttachment", vec![ticket_id(id), json!(filename)])?;
        class_hint::decode_binary(&raw).map_err(|err| err.with_method("ticket.getAttachment"))
    }

    pub fn fetch_attachment(&self, id: i64, mut attachment: Attachment) -> ApiResult<Attachment> {
        attachment.content = self.attachment(id, &attachment.filename)?;
        Ok(attachment)
    }

    /// Uploads an attachment and returns the filename the server stored it under.
    pub fn put_attachment(
        &self,
        id: i64,
        filename: &str,
        description: &str,
        data: &[u8],
        replace: bool,
    ) -> ApiResult<String> {
        self.client.call(
            "ticket.putAttachment",
            vec![
                ticket_id(id),
                json!(filename),
                json!(description),
                class_hint::encode_binary(data),
                json!(replace),
            ],
        )
    }

    pub fn delete_attachment(&self, id: i64, filename: &str) -> ApiResult<bool> {
        self.client.call(
            "ticket.deleteAttachment",
            vec![ticket_id(id), json!(filename)],
        )
    }

    pub fn recent_changes(&self, since: OffsetDateTime) -> ApiResult<Vec<i64>> {
        let _ = since;
        Err(Error::unsupported("ticket.getRecentChanges"))
    }

    pub fn actions(&self, id: i64) -> ApiResult<Vec<String>> {
        let _ = id;
        Err(Error::unsupported("ticket.getActions"))
    }

    pub fn update(&self, ticket: &Ticket, comment: &str) -> ApiResult<Ticket> {
        let _ = (ticket, comment);
        Err(Error::unsupported("ticket.update"))
    }

    pub fn changelog(&self, id: i64) -> ApiResult<Vec<Value>> {
        let _ = id;
        Err(Error::unsupported("ticket.changeLog"))
    }

    pub fn components(&self) -> ApiResult<Vec<String>> {
        self.client.names("ticket.component.getAll")
    }

    pub fn component(&self, name: &str) -> ApiResult<Component> {
        self.client.call("ticket.component.get", vec![json!(name)])
    }

    pub fn create_component(&self, name: &str, component: &Component) -> ApiResult<i64> {
        self.client.call(
            "ticket.component.create",
            vec![json!(name), to_param(component)?],
        )
    }

    pub fn update_component(&self, name: &str, component: &Component) -> ApiResult<i64> {
        self.client.call(
            "ticket.component.update",
            vec![json!(name), to_param(component)?],
        )
    }

    pub fn delete_component(&self, name: &str) -> ApiResult<i64> {
        self.client.call("ticket.component.delete", vec![json!(name)])
    }

    pub fn milestones(&self) -> ApiResult<Vec<String>> {
        self.client.names("ticket.milestone.getAll")
    }

    pub fn milestone(&self, name: &str) -> ApiResult<Milestone> {
        self.client.call("ticket.milestone.get", vec![json!(name)])
    }

    pub fn create_milestone(&self, name: &str, milestone: &Milestone) -> ApiResult<i64> {
        self.client.call(
            "ticket.milestone.create",
            vec![json!(name), to_param(milestone)?],
        )
    }

    pub fn update_milestone(&self, name: &str, milestone: &Milestone) -> ApiResult<i64> {
        self.client.call(
            "ticket.milestone.update",
            vec![json!(name), to_param(milestone)?],
        )
    }

    pub fn delete_milestone(&self, name: &str) -> ApiResult<i64> {
        self.client.call("ticket.milestone.delete", vec![json!(name)])
    }

    pub fn versions(&self) -> ApiResult<Vec<String>> {
        self.client.names("ticket.version.getAll")
    }

    pub fn version(&self, name: &str) -> ApiResult<Version> {
        self.client.call("ticket.version.get", vec![json!(name)])
    }

    pub fn create_version(&self, name: &str, version: &Version) -> ApiResult<i64> {
        self.client.call(
            "ticket.version.create",
            vec![json!(name), to_param(version)?],
        )
    }

    pub fn update_version(&self, name: &str, version: &Version) -> ApiResult<i64> {
        self.client.call(
            "ticket.version.update",
            vec![json!(name), to_param(version)?],
        )
    }

    pub fn delete_version(&self, name: &str) -> ApiResult<i64> {
        self.client.call("ticket.version.delete", vec![json!(name)])
    }

    /// All states described by the active workflow.
    pub fn statuses(&self) -> ApiResult<Vec<String>> {
        self.client.names("ticket.status.getAll")
    }

    pub fn enum_names(&self, kind: TicketEnum) -> ApiResult<Vec<String>> {
        self.client.names(&kind.method("getAll"))
    }

    pub fn enum_value(&self, kind: TicketEnum, name: &str) -> ApiResult<i64> {
        let method = kind.method("get");
        let raw = self.client.call_value(&method, vec![json!(name)])?;
        enum_value_from_wire(&raw).map_err(|err| err.with_method(method))
    }

    pub fn create_enum(&self, kind: TicketEnum, name: &str, value: i64) -> ApiResult<i64> {
        self.client.call(
            &kind.method("create"),
            vec![json!(name), json!(value.to_string())],
        )
    }

    pub fn update_enum(&self, kind: TicketEnum, name: &str, value: i64) -> ApiResult<i64> {
        self.client.call(
            &kind.method("update"),
            vec![json!(name), json!(value.to_string())],
        )
    }

    pub fn delete_enum(&self, kind: TicketEnum, name: &str) -> ApiResult<i64> {
        self.client.call(&kind.method("delete"), vec![json!(name)])
    }
}

fn ticket_id(id: i64) -> Value {
    Value::String(id.to_string())
}

fn to_param<T: Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode request parameter")
            .with_source(err)
    })
}

fn enum_value_from_wire(raw: &Value) -> ApiResult<i64> {
    let parsed = match raw {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        Error::new(ErrorKind::Decode).with_message(format!("enum value {raw} is not an integer"))
    })
}
