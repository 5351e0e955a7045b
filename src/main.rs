//! Purpose: `stargaze` CLI entry point.
//! Role: Binary crate root; fetches one repository and prints one line about it.
//! Invariants: stdout carries only the result line (summary, JSON, or failure notice).
//! Invariants: Diagnostics go to stderr (tracing logs, usage errors as JSON when piped).
//! Invariants: No body exits 1; parse/decode failures are printed on stdout and exit 0.
use std::error::Error as StdError;
use std::io::{self, IsTerminal};

use clap::{Parser, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use stargaze::api::{Error, ErrorKind, FetchOutput, HttpTransport, fetch_blocking, to_exit_code};
use stargaze::github::{DEFAULT_REPO_URL, decode_repo};
use stargaze::json::ToJson;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

#[derive(Parser)]
#[command(
    name = "stargaze",
    version,
    about = "Fetch a GitHub repository and print its star count",
    long_about = None,
    after_help = r#"EXAMPLES
  $ stargaze
  vdka/json has 42 stars. Why not make it 1 more!
  $ stargaze --url https://api.github.com/repos/rust-lang/rust
  $ stargaze --json

Set RUST_LOG=debug to trace the request on stderr."#
)]
struct Cli {
    #[arg(
        long,
        default_value = DEFAULT_REPO_URL,
        value_parser = parse_url,
        help = "Repository endpoint to GET"
    )]
    url: Url,
    #[arg(
        long,
        help = "Treat any transport error as fatal, even when a body was returned"
    )]
    strict: bool,
    #[arg(long, help = "Print the decoded repository as one JSON line")]
    json: bool,
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                return Ok(RunOutcome::ok());
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage).with_message(clap_error_summary(&err)));
            }
        },
    };

    let output = fetch_blocking(&HttpTransport::new(), &cli.url);
    let (line, outcome) = render_outcome(output, &cli);
    if let Some(line) = line {
        println!("{line}");
    }
    Ok(outcome)
}

fn render_outcome(output: FetchOutput, cli: &Cli) -> (Option<String>, RunOutcome) {
    let FetchOutput {
        body,
        response,
        error,
    } = output;
    let Some(body) = body else {
        if let Some(err) = &error {
            tracing::warn!(error = %err, "no response body");
        }
        return (None, RunOutcome::with_code(1));
    };
    if let Some(err) = error {
        if cli.strict {
            tracing::warn!(error = %err, "transport error with body; failing in strict mode");
            return (None, RunOutcome::with_code(1));
        }
        tracing::warn!(error = %err, "transport error with body; continuing");
    }
    if let Some(meta) = &response {
        tracing::debug!(status = meta.status, url = %meta.url, "decoding response");
    }

    let line = match decode_repo(&body) {
        Ok(repo) if cli.json => repo.to_json().to_string(),
        Ok(repo) => repo.summary(),
        Err(err) => format!("Some {} occurred", failure_description(&err)),
    };
    (Some(line), RunOutcome::ok())
}

fn failure_description(err: &Error) -> String {
    match err.message() {
        Some(message) => message.to_string(),
        None => format!("{:?} error", err.kind()),
    }
}

fn parse_url(value: &str) -> Result<Url, String> {
    Url::parse(value).map_err(|err| format!("invalid url `{value}`: {err}"))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {}", failure_description(err));
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(failure_description(err)));
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(source) = current {
        causes.push(source.to_string());
        current = source.source();
    }
    causes
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
