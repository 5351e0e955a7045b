//! Purpose: Adapt a callback-based HTTP data task into one blocking call.
//! Exports: `Transport`, `Completion`, `HttpTransport`, `ResponseMeta`, `FetchOutput`,
//! `fetch_blocking`.
//! Role: The only network seam; the binary and tests both drive requests through it.
//! Invariants: `fetch_blocking` issues exactly one request and waits for one completion.
//! Invariants: Completion may fire synchronously or on any thread without deadlock.
//! Invariants: Non-2xx statuses are not transport errors; body and metadata still flow.
//! Notes: No retries, no added timeout, no connection reuse across calls.

use crate::core::error::{Error, ErrorKind};
use crate::core::signal::Signal;
use std::io::Read;
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

pub type Completion =
    Box<dyn FnOnce(Option<Vec<u8>>, Option<ResponseMeta>, Option<Error>) + Send + 'static>;

/// A data task that reports its outcome through a completion callback.
///
/// Implementations must invoke `completion` exactly once, either before returning
/// or later from any thread.
pub trait Transport {
    fn data_task(&self, url: &Url, completion: Completion);
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResponseMeta {
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
}

impl ResponseMeta {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Default)]
pub struct FetchOutput {
    pub body: Option<Vec<u8>>,
    pub response: Option<ResponseMeta>,
    pub error: Option<Error>,
}

#[derive(Default)]
struct Handoff {
    output: Mutex<FetchOutput>,
    done: Signal,
}

pub fn fetch_blocking<T>(transport: &T, url: &Url) -> FetchOutput
where
    T: Transport + ?Sized,
{
    let handoff = Arc::new(Handoff::default());
    let writer = handoff.clone();
    tracing::debug!(url = %url, "issuing request");
    let completion: Completion = Box::new(move |body, response, error| {
        {
            let mut output = writer
                .output
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            output.body = body;
            output.response = response;
            output.error = error;
        }
        writer.done.post();
    });
    transport.data_task(url, completion);
    handoff.done.wait();

    let output = std::mem::take(
        &mut *handoff
            .output
            .lock()
            .unwrap_or_else(PoisonError::into_inner),
    );
    tracing::debug!(
        status = output.response.as_ref().map(|meta| meta.status),
        body_len = output.body.as_ref().map(Vec::len),
        failed = output.error.is_some(),
        "request completed"
    );
    output
}

/// Production transport: one fresh `ureq` agent per task, run on its own worker thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for HttpTransport {
    fn data_task(&self, url: &Url, completion: Completion) {
        let pending = Arc::new(Mutex::new(Some(completion)));
        let worker_pending = pending.clone();
        let url = url.clone();
        let spawned = std::thread::Builder::new()
            .name("stargaze-http".to_string())
            .spawn(move || {
                let (body, response, error) = perform_get(&url);
                if let Some(completion) = take_pending(&worker_pending) {
                    completion(body, response, error);
                }
            });
        if let Err(err) = spawned {
            if let Some(completion) = take_pending(&pending) {
                completion(
                    None,
                    None,
                    Some(
                        Error::new(ErrorKind::Internal)
                            .with_message("failed to spawn http worker")
                            .with_source(err),
                    ),
                );
            }
        }
    }
}

fn take_pending(pending: &Mutex<Option<Completion>>) -> Option<Completion> {
    pending
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}

fn perform_get(url: &Url) -> (Option<Vec<u8>>, Option<ResponseMeta>, Option<Error>) {
    let agent = ureq::AgentBuilder::new().build();
    let response = match agent.get(url.as_str()).call() {
        Ok(resp) => resp,
        Err(ureq::Error::Status(_, resp)) => resp,
        Err(ureq::Error::Transport(err)) => {
            tracing::warn!(url = %url, error = %err, "request failed");
            return (
                None,
                None,
                Some(
                    Error::new(ErrorKind::Transport)
                        .with_message("request failed")
                        .with_source(err),
                ),
            );
        }
    };

    let meta = response_meta(&response);
    let mut body = Vec::new();
    match response.into_reader().read_to_end(&mut body) {
        Ok(_) => (Some(body), Some(meta), None),
        Err(err) => {
            tracing::warn!(url = %url, error = %err, "failed to read response body");
            (
                None,
                Some(meta),
                Some(
                    Error::new(ErrorKind::Transport)
                        .with_message("failed to read response body")
                        .with_source(err),
                ),
            )
        }
    }
}

fn response_meta(response: &ureq::Response) -> ResponseMeta {
    let headers = response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            let value = response.header(&name)?.to_string();
            Some((name, value))
        })
        .collect();
    ResponseMeta {
        url: response.get_url().to_string(),
        status: response.status(),
        status_text: response.status_text().to_string(),
        headers,
    }
}
