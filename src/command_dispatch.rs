//! Purpose: Execute one parsed CLI command against a `Client`.
//! Role: Maps subcommands onto facade calls and record renderers.
//! Invariants: Each command emits exactly one JSON document on success.
//! Invariants: Local file failures are `ErrorKind::Io`; everything else comes from the client.
use std::fs;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use tracrpc::api::{Client, Error, ErrorKind};

use super::record_json::{
    api_version_json, attachment_json, field_info_json, page_info_json, page_json, ticket_json,
};
use super::{AttachmentArgs, Command, RunOutcome, TicketCommand, WikiCommand, emit_json};

pub(super) fn dispatch_command(command: Command, client: &Client) -> Result<RunOutcome, Error> {
    let value = match command {
        Command::Version => api_version_json(client.system().api_version()?),
        Command::Methods => json!(client.system().methods()?),
        Command::MethodHelp { name } => json!({
            "method": name,
            "help": client.system().method_help(&name)?,
        }),
        Command::Ticket(command) => dispatch_ticket(command, client)?,
        Command::Wiki(command) => dispatch_wiki(command, client)?,
    };
    emit_json(value);
    Ok(RunOutcome::ok())
}

fn dispatch_ticket(command: TicketCommand, client: &Client) -> Result<Value, Error> {
    let tickets = client.ticket();
    Ok(match command {
        TicketCommand::Get { id } => ticket_json(&tickets.get(id)?),
        TicketCommand::Query { query } => json!(tickets.query(&query)?),
        TicketCommand::Open => json!(tickets.open_ids()?),
        TicketCommand::Fields => {
            Value::Array(tickets.fields()?.iter().map(field_info_json).collect())
        }
        TicketCommand::Attachments { id } => {
            Value::Array(tickets.attachments(id)?.iter().map(attachment_json).collect())
        }
        TicketCommand::Attachment(args) => download_attachment(args, client)?,
    })
}

fn download_attachment(args: AttachmentArgs, client: &Client) -> Result<Value, Error> {
    let content = client.ticket().attachment(args.id, &args.filename)?;
    let Some(path) = args.out else {
        return Ok(json!({
            "ticket": args.id,
            "filename": args.filename,
            "bytes": content.len(),
            "content_base64": STANDARD.encode(&content),
        }));
    };
    fs::write(&path, &content).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message(format!("failed to write {}", path.display()))
            .with_hint("Check that the parent directory exists and is writable.")
            .with_source(err)
    })?;
    Ok(json!({
        "ticket": args.id,
        "filename": args.filename,
        "bytes": content.len(),
        "path": path.display().to_string(),
    }))
}

fn dispatch_wiki(command: WikiCommand, client: &Client) -> Result<Value, Error> {
    let wiki = client.wiki();
    Ok(match command {
        WikiCommand::Pages => json!(wiki.pages()?),
        WikiCommand::Info { name } => page_info_json(&wiki.page_info(&name)?),
        WikiCommand::Page { name } => page_json(&wiki.page(&name)?),
    })
}
