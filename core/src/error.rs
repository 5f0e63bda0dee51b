//! Error types for the OCR client.
//!
//! # Design
//! Failures are split by the stage that produced them. `EncodeError` stops
//! the pipeline before any request is built, `TransportError` means the
//! exchange itself did not complete, and `HttpStatusError` carries a
//! completed but non-200 response so the caller can still inspect it.
//! `OcrError` is the union returned by the end-to-end helpers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The source image could not be read.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The file is missing or unreadable.
    #[error("read file {} failed: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The HTTP exchange did not complete.
#[derive(Debug, Error)]
pub enum TransportError {
    /// DNS, connect, TLS or I/O failure, with the transport's diagnostic text.
    #[error("post failed: {0}")]
    TransportFailure(String),

    /// The response buffer could not grow to hold the next chunk.
    #[error("response buffer could not grow to {requested} bytes (limit {limit:?})")]
    AllocationFailure {
        requested: usize,
        limit: Option<usize>,
    },
}

/// A completed response whose status was not 200.
#[derive(Debug, Error)]
#[error("http code: {status}")]
pub struct HttpStatusError {
    pub status: u16,
    pub headers: String,
    pub body: String,
}

/// Errors from the full encode → compose → post pipeline.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    HttpStatus(#[from] HttpStatusError),
}
