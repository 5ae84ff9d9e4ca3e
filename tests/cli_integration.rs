// CLI integration tests: drive the binary against the loopback mock.
mod support;

use std::process::{Command, Output};

use serde_json::{Value, json};
use support::{MockTrac, TestResult};

fn cmd() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_tracrpc"));
    command.env_remove("TRAC_URL").env_remove("RUST_LOG");
    command
}

fn run(server: &MockTrac, args: &[&str]) -> Output {
    cmd()
        .arg("--url")
        .arg(server.endpoint())
        .args(args)
        .output()
        .expect("run tracrpc")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

fn stderr_json(output: &Output) -> Value {
    let text = String::from_utf8_lossy(&output.stderr);
    let line = text.lines().last().expect("stderr line");
    serde_json::from_str(line).expect("stderr json")
}

#[test]
fn version_prints_api_version() -> TestResult<()> {
    let server = MockTrac::start()?;
    server.on_result("system.getAPIVersion", json!([1, 1, 8]));

    let output = run(&server, &["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({"epoch": 1, "major": 1, "minor": 8})
    );
    Ok(())
}

#[test]
fn endpoint_can_come_from_environment() -> TestResult<()> {
    let server = MockTrac::start()?;
    server.on_result("ticket.query", json!([3, 5, 8]));

    let output = cmd()
        .env("TRAC_URL", server.endpoint())
        .args(["ticket", "open"])
        .output()?;
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), json!([3, 5, 8]));
    assert_eq!(server.calls()[0].params, json!(["max=0&status!=closed"]));
    Ok(())
}

#[test]
fn ticket_get_renders_rfc3339_times() -> TestResult<()> {
    let server = MockTrac::start()?;
    server.on_result(
        "ticket.get",
        json!([
            12,
            {"__jsonclass__": ["datetime", "2024-03-01T12:00:00"]},
            {"__jsonclass__": ["datetime", "2024-03-02T13:30:00"]},
            {"summary": "Printer on fire", "status": "new", "cc": ""}
        ]),
    );

    let output = run(&server, &["ticket", "get", "12"]);
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({
            "id": 12,
            "time": "2024-03-01T12:00:00Z",
            "changetime": "2024-03-02T13:30:00Z",
            "summary": "Printer on fire",
            "status": "new"
        })
    );
    Ok(())
}

#[test]
fn attachment_download_writes_file() -> TestResult<()> {
    let server = MockTrac::start()?;
    server.on_result(
        "ticket.getAttachment",
        json!({"__jsonclass__": ["binary", "aGVsbG8="]}),
    );
    let temp = tempfile::tempdir()?;
    let path = temp.path().join("hello.txt");
    let path_arg = path.to_str().expect("utf8 path");

    let output = run(
        &server,
        &["ticket", "attachment", "4", "hello.txt", "--out", path_arg],
    );
    assert!(output.status.success());
    assert_eq!(std::fs::read(&path)?, b"hello");
    let summary = stdout_json(&output);
    assert_eq!(summary["bytes"], 5);
    assert_eq!(summary["path"], path_arg);
    assert_eq!(server.calls()[0].params, json!(["4", "hello.txt"]));
    Ok(())
}

#[test]
fn attachment_without_out_embeds_base64() -> TestResult<()> {
    let server = MockTrac::start()?;
    server.on_result(
        "ticket.getAttachment",
        json!({"__jsonclass__": ["binary", "aGVsbG8="]}),
    );

    let output = run(&server, &["ticket", "attachment", "4", "hello.txt"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["content_base64"], "aGVsbG8=");
    Ok(())
}

#[test]
fn unwritable_out_path_is_io_error() -> TestResult<()> {
    let server = MockTrac::start()?;
    server.on_result(
        "ticket.getAttachment",
        json!({"__jsonclass__": ["binary", "aGVsbG8="]}),
    );
    let temp = tempfile::tempdir()?;
    let path = temp.path().join("missing").join("hello.txt");

    let output = run(
        &server,
        &[
            "ticket",
            "attachment",
            "4",
            "hello.txt",
            "--out",
            path.to_str().expect("utf8 path"),
        ],
    );
    assert_eq!(output.status.code(), Some(7));
    assert_eq!(stderr_json(&output)["error"]["kind"], "Io");
    Ok(())
}

#[test]
fn remote_fault_maps_to_exit_code_and_json_error() -> TestResult<()> {
    let server = MockTrac::start()?;
    server.on_fault("wiki.getPageInfo", 200, 404, "ResourceNotFound", "Wiki page \"Nope\" does not exist");

    let output = run(&server, &["wiki", "info", "Nope"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(output.stdout.is_empty());
    let err = stderr_json(&output);
    assert_eq!(err["error"]["kind"], "Remote");
    assert_eq!(err["error"]["method"], "wiki.getPageInfo");
    assert_eq!(err["error"]["fault"]["name"], "ResourceNotFound");
    Ok(())
}

#[test]
fn missing_url_is_usage_error() {
    let output = cmd().arg("methods").output().expect("run tracrpc");
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr_json(&output)["error"]["kind"], "Usage");
}

#[test]
fn invalid_url_is_usage_error() {
    let output = cmd()
        .args(["--url", "ftp://trac.example.com/jsonrpc", "methods"])
        .output()
        .expect("run tracrpc");
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr_json(&output)["error"]["kind"], "Usage");
}

#[test]
fn wiki_pages_lists_names() -> TestResult<()> {
    let server = MockTrac::start()?;
    server.on_result("wiki.getAllPages", json!(["WikiStart", "TracGuide"]));

    let output = run(&server, &["wiki", "pages"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), json!(["WikiStart", "TracGuide"]));
    Ok(())
}
