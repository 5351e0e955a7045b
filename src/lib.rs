//! Purpose: Library crate behind the `stargaze` CLI and its tests.
//! Exports: `api` (blocking fetch), `json` (value, parser, typed decode/encode), `github`.
//! Role: Keeps the decoding protocol and the fetch adapter testable without the network.
//! Invariants: Decoding is pure; the only side effect lives in `api::HttpTransport`.
pub mod api;
pub mod core;
pub mod github;
pub mod json;
