//! Client configuration.

/// Settings for an `OcrClient` session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Verify the server's TLS certificate chain. On by default.
    pub verify_tls: bool,
    /// Maximum number of response bytes (header block included) to buffer.
    pub response_limit: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            verify_tls: true,
            response_limit: None,
        }
    }
}

impl ClientConfig {
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn response_limit(mut self, limit: usize) -> Self {
        self.response_limit = Some(limit);
        self
    }
}
