//! Session object that posts OCR requests and buffers the responses.
//!
//! # Design
//! `OcrClient` is created once and reused. It owns the transport (and with
//! it the connection pool and TLS setup), so process-wide transport state is
//! tied to the session's lifetime instead of being set up per call. Each
//! `post` allocates a fresh `ResponseBuffer`, hands the transport a write
//! callback that appends to it, then slices the buffer at the reported
//! header size. Everything a call allocates is owned by that call and
//! dropped on every return path.

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::buffer::{GrowError, ResponseBuffer};
use crate::config::ClientConfig;
use crate::encoder::encode_file;
use crate::error::{OcrError, TransportError};
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::request::{compose, WireFormat};

/// Synchronous client for the APPCODE OCR service.
pub struct OcrClient<T = UreqTransport> {
    transport: T,
    config: ClientConfig,
}

impl OcrClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        if !config.verify_tls {
            warn!("TLS certificate verification is disabled");
        }
        Self {
            transport: UreqTransport::new(&config),
            config,
        }
    }
}

impl Default for OcrClient<UreqTransport> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl<T: Transport> OcrClient<T> {
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// POST `body` to `url` with `APPCODE` authorization.
    ///
    /// Any completed exchange is `Ok`, whatever its status; use
    /// `HttpResponse::check_status` to treat non-200 as an error.
    pub fn post(
        &self,
        url: &str,
        api_key: &str,
        body: &str,
    ) -> Result<HttpResponse, TransportError> {
        let request = HttpRequest::post_json(url, api_key, body.to_string());
        self.execute(&request)
    }

    /// Run `request` through the transport, accumulating the response.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut raw = match self.config.response_limit {
            Some(limit) => ResponseBuffer::with_limit(limit),
            None => ResponseBuffer::new(),
        };
        let mut grow_error: Option<GrowError> = None;

        debug!(url = %request.url, bytes = request.body.len(), "posting request");
        let result = {
            let mut on_write = |chunk: &[u8]| match raw.append(chunk) {
                Ok(()) => chunk.len(),
                Err(e) => {
                    grow_error = Some(e);
                    0
                }
            };
            self.transport.perform(request, &mut on_write)
        };

        if let Some(e) = grow_error {
            let err = TransportError::from(e);
            error!(url = %request.url, error = %err, "response accumulation aborted");
            return Err(err);
        }
        let info = result.inspect_err(|e| {
            error!(url = %request.url, error = %e, "transfer failed");
        })?;

        debug!(status = info.status, bytes = raw.len(), "response buffered");
        Ok(HttpResponse {
            status: info.status,
            header_size: info.header_size,
            raw,
        })
    }

    /// Encode the image at `image_path`, compose the body for `format`, post
    /// it, and return the body of a 200 response.
    ///
    /// An unreadable image stops here, before anything is sent.
    pub fn recognize(
        &self,
        url: &str,
        api_key: &str,
        image_path: impl AsRef<Path>,
        configure: &str,
        format: WireFormat,
    ) -> Result<String, OcrError> {
        let image = encode_file(image_path)?;
        let body = compose(&image, configure, format)?;
        info!(url, ?format, bytes = body.len(), "sending OCR request");

        let response = self.post(url, api_key, &body)?;
        let text = response.check_status().inspect_err(|e| {
            warn!(status = e.status, "OCR service returned an error status");
        })?;
        Ok(text)
    }
}
