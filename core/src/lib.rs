//! Synchronous client core for the APPCODE OCR service.
//!
//! # Overview
//! Reads an image, base64-encodes it, wraps it in one of the service's two
//! JSON request schemas, and POSTs it with `APPCODE` authorization. The
//! response is streamed into a growable buffer and split into header and
//! body text.
//!
//! # Design
//! - `encoder` and `request` are pure functions over bytes and strings.
//! - `OcrClient` is a reusable session that owns the transport; the
//!   `Transport` trait is the only I/O seam, so everything above it is
//!   testable with a scripted transport.
//! - Non-200 responses are data, not transport errors. `check_status`
//!   turns them into `HttpStatusError` when the caller wants that.

pub mod buffer;
pub mod client;
pub mod config;
pub mod encoder;
pub mod error;
pub mod http;
pub mod request;

pub use buffer::ResponseBuffer;
pub use client::OcrClient;
pub use config::ClientConfig;
pub use encoder::{encode_bytes, encode_file};
pub use error::{EncodeError, HttpStatusError, OcrError, TransportError};
pub use http::{HttpRequest, HttpResponse, TransferInfo, Transport, UreqTransport};
pub use request::{compose, RequestBody, WireFormat};
