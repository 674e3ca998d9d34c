#![warn(missing_docs)]
//! `grid-core-wire` - patch wire protocol for `grid-core`.
//!
//! This crate carries edit proposals from a [`grid_core::GridController`] to the authority that
//! owns the data, and carries the answers back. It provides JSON message framing, the
//! request/reply message shapes, and two [`grid_core::PatchAuthority`] implementations:
//!
//! - [`StdioAuthority`]: a child process spoken to over framed stdio,
//! - [`InProcessAuthority`]: a handler closure on a worker thread.

pub mod client;
pub mod codec;
pub mod in_process;
pub mod transport;

use thiserror::Error;

pub use client::StdioAuthority;
pub use codec::{PatchCodec, error_message, request_message, result_message};
pub use in_process::{InProcessAuthority, PatchHandler};
pub use transport::{read_message, write_message};

#[derive(Debug, Error)]
/// Errors produced while framing or decoding wire messages.
pub enum WireError {
    #[error("I/O error: {0}")]
    /// Underlying reader/writer failure.
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    /// Message body is not valid JSON.
    Json(#[from] serde_json::Error),

    #[error("missing Content-Length header")]
    /// A header block ended without a `Content-Length`.
    MissingContentLength,

    #[error("invalid Content-Length: {0}")]
    /// `Content-Length` is not a byte count.
    InvalidContentLength(String),

    #[error("unexpected end of stream inside a header block")]
    /// The stream ended after a partial header.
    UnexpectedEof,

    #[error("malformed message: {0}")]
    /// A reply without an id or without a `result`/`error` member.
    MalformedMessage(String),
}
