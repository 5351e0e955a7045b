//! Purpose: Define the public Rust API boundary for stargaze.
//! Exports: Error types and the blocking fetch adapter used by the CLI and tests.
//! Role: Public surface; hides how the transport and signal are wired internally.
//! Invariants: This module is the only public path to the fetch machinery.

mod fetch;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use fetch::{Completion, FetchOutput, HttpTransport, ResponseMeta, Transport, fetch_blocking};
