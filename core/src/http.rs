//! HTTP transport seam and the ureq-backed transport.
//!
//! # Design
//! `HttpRequest` and `HttpResponse` describe the exchange as plain data.
//! The `Transport` trait performs one POST and streams the response, header
//! block first, into a write callback; it reports the status and the size of
//! the header block once the transfer completes. `OcrClient` owns the buffer
//! the callback appends to and does the header/body split, so tests can swap
//! in a scripted transport without touching the network.

use std::borrow::Cow;
use std::io::Read;

use tracing::debug;
use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::buffer::ResponseBuffer;
use crate::config::ClientConfig;
use crate::error::{HttpStatusError, TransportError};

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_UTF8: &str = "application/json; charset=UTF-8";

const READ_CHUNK: usize = 16 * 1024;

/// A POST request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpRequest {
    /// Build the OCR POST: `APPCODE` authorization with the key passed
    /// through verbatim, and a JSON content type.
    pub fn post_json(url: &str, api_key: &str, body: String) -> Self {
        Self {
            url: url.to_string(),
            headers: vec![
                (AUTHORIZATION.to_string(), format!("APPCODE {api_key}")),
                (CONTENT_TYPE.to_string(), JSON_UTF8.to_string()),
            ],
            body,
        }
    }
}

/// What the transport reports after a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferInfo {
    pub status: u16,
    /// Byte length of the header block at the start of the stream.
    pub header_size: usize,
}

/// Receives response chunks. Returning fewer bytes than the chunk holds
/// tells the transport to abort the transfer.
pub type WriteCallback<'a> = dyn FnMut(&[u8]) -> usize + 'a;

/// Performs one HTTP POST.
pub trait Transport {
    /// Send `request` and feed the response (header block, then body) to
    /// `on_write` in arrival order. A short write from `on_write` must abort
    /// the transfer with an error.
    fn perform(
        &self,
        request: &HttpRequest,
        on_write: &mut WriteCallback<'_>,
    ) -> Result<TransferInfo, TransportError>;
}

/// A completed response: status plus the raw header+body stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub header_size: usize,
    pub raw: ResponseBuffer,
}

impl HttpResponse {
    pub fn headers(&self) -> &[u8] {
        self.raw.split_at(self.header_size).0
    }

    pub fn body(&self) -> &[u8] {
        self.raw.split_at(self.header_size).1
    }

    pub fn header_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.headers())
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.body())
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// The body on 200, otherwise an `HttpStatusError` carrying both halves.
    pub fn check_status(&self) -> Result<String, HttpStatusError> {
        if self.is_ok() {
            return Ok(self.body_text().into_owned());
        }
        Err(HttpStatusError {
            status: self.status,
            headers: self.header_text().into_owned(),
            body: self.body_text().into_owned(),
        })
    }
}

/// `Transport` backed by a ureq `Agent`.
///
/// The agent holds the connection pool and TLS configuration, so one
/// transport should be built and reused for every request. Redirects are
/// not followed: a 3xx comes back as the response to the one POST.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let tls = TlsConfig::builder()
            .disable_verification(!config.verify_tls)
            .build();
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .tls_config(tls)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn perform(
        &self,
        request: &HttpRequest,
        on_write: &mut WriteCallback<'_>,
    ) -> Result<TransferInfo, TransportError> {
        let mut builder = self.agent.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let response = builder
            .send(request.body.as_bytes())
            .map_err(|e| TransportError::TransportFailure(e.to_string()))?;

        let (parts, body) = response.into_parts();
        let status = parts.status.as_u16();

        let mut head = format!("{:?} {}\r\n", parts.version, parts.status).into_bytes();
        for (name, value) in parts.headers.iter() {
            head.extend_from_slice(name.as_str().as_bytes());
            head.extend_from_slice(b": ");
            head.extend_from_slice(value.as_bytes());
            head.extend_from_slice(b"\r\n");
        }
        head.extend_from_slice(b"\r\n");
        let header_size = head.len();
        deliver(on_write, &head)?;

        let mut reader = body.into_reader();
        let mut chunk = vec![0u8; READ_CHUNK];
        loop {
            let n = reader
                .read(&mut chunk)
                .map_err(|e| TransportError::TransportFailure(e.to_string()))?;
            if n == 0 {
                break;
            }
            deliver(on_write, &chunk[..n])?;
        }

        debug!(status, header_size, "transfer complete");
        Ok(TransferInfo { status, header_size })
    }
}

fn deliver(on_write: &mut WriteCallback<'_>, chunk: &[u8]) -> Result<(), TransportError> {
    let written = on_write(chunk);
    if written != chunk.len() {
        return Err(TransportError::TransportFailure(format!(
            "failed writing received data: callback took {written} of {} bytes",
            chunk.len()
        )));
    }
    Ok(())
}
