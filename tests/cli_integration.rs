//! Purpose: End-to-end tests for the `stargaze` binary against a loopback HTTP server.
//! Exports: None (integration test module).
//! Role: Validate stdout lines and exit codes for success, decode failure, and no body.
//! Invariants: Uses a one-shot loopback server; no external network access.
//! Invariants: Bounded reads avoid hanging when the client misbehaves.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::process::{Command, Output};
use std::thread::JoinHandle;
use std::time::Duration;

type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

const REPO_BODY: &str = r#"{"name":"json","full_name":"vdka/json","description":"d","html_url":"https://github.com/vdka/json","fork":false,"stargazers_count":42,"created_at":"2016-01-01T00:00:00Z","updated_at":"2016-01-02T00:00:00Z","pushed_at":"2016-01-03T00:00:00Z"}"#;

struct OneShotServer {
    url: String,
    handle: JoinHandle<()>,
}

impl OneShotServer {
    fn start(status_line: &'static str, body: &'static str) -> TestResult<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let url = format!("http://{}/repos/vdka/json", listener.local_addr()?);
        let handle = std::thread::spawn(move || {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
            let mut reader = BufReader::new(&stream);
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) | Err(_) => break,
                    Ok(_) if line == "\r\n" => break,
                    Ok(_) => {}
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = &stream;
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        });
        Ok(Self { url, handle })
    }

    fn finish(self) {
        let _ = self.handle.join();
    }
}

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_stargaze");
    let mut command = Command::new(exe);
    command.env_remove("RUST_LOG");
    command
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn closed_port_url() -> TestResult<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}/repos/vdka/json"))
}

#[test]
fn prints_summary_for_repository() -> TestResult<()> {
    let server = OneShotServer::start("200 OK", REPO_BODY)?;
    let output = cmd().args(["--url", &server.url]).output()?;
    server.finish();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_text(&output),
        "vdka/json has 42 stars. Why not make it 1 more!\n"
    );
    Ok(())
}

#[test]
fn json_flag_prints_reencoded_record() -> TestResult<()> {
    let server = OneShotServer::start("200 OK", REPO_BODY)?;
    let output = cmd().args(["--url", &server.url, "--json"]).output()?;
    server.finish();

    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_str(stdout_text(&output).trim())?;
    assert_eq!(value["full_name"], "vdka/json");
    assert_eq!(value["stargazers_count"], 42);
    assert_eq!(value["pushed_at"], "2016-01-03T00:00:00Z");
    Ok(())
}

#[test]
fn not_found_status_still_decodes_body() -> TestResult<()> {
    let server = OneShotServer::start("404 Not Found", r#"{"message":"Not Found"}"#)?;
    let output = cmd().args(["--url", &server.url]).output()?;
    server.finish();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_text(&output),
        "Some key not found \"name\" occurred\n"
    );
    Ok(())
}

#[test]
fn malformed_json_is_reported_on_stdout() -> TestResult<()> {
    let server = OneShotServer::start("200 OK", "{\"name\":")?;
    let output = cmd().args(["--url", &server.url]).output()?;
    server.finish();

    assert_eq!(output.status.code(), Some(0));
    let text = stdout_text(&output);
    assert!(text.starts_with("Some JSON eof error"), "{text}");
    assert!(text.ends_with(" occurred\n"), "{text}");
    Ok(())
}

#[test]
fn wrong_field_type_is_reported_on_stdout() -> TestResult<()> {
    let body = r#"{"name":"json","full_name":7}"#;
    let server = OneShotServer::start("200 OK", body)?;
    let output = cmd().args(["--url", &server.url]).output()?;
    server.finish();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_text(&output), "Some bad value (integer) 7 occurred\n");
    Ok(())
}

#[test]
fn connection_failure_exits_one_without_output() -> TestResult<()> {
    let output = cmd().args(["--url", &closed_port_url()?]).output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn invalid_url_is_usage_error() -> TestResult<()> {
    let output = cmd().args(["--url", "not a url"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stderr).trim())?;
    assert_eq!(stderr["error"]["kind"], "Usage");
    Ok(())
}

#[test]
fn version_flag_exits_zero() -> TestResult<()> {
    let output = cmd().arg("--version").output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_text(&output).starts_with("stargaze "));
    Ok(())
}
