//! Reads an image file and produces its base64 text.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::error::EncodeError;

/// Encode bytes as standard padded base64 (RFC 4648), without line breaks.
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Read the whole file at `path` in one pass and base64-encode it.
///
/// The read buffer is sized from the file's metadata up front. A file that
/// cannot be opened or read yields `EncodeError::FileNotFound`.
pub fn encode_file(path: impl AsRef<Path>) -> Result<String, EncodeError> {
    let path = path.as_ref();
    let not_found = |source: std::io::Error| EncodeError::FileNotFound {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "read file failed");
        not_found(e)
    })?;
    let size = file.metadata().map(|m| m.len() as usize).unwrap_or(0);

    let mut bytes = Vec::with_capacity(size);
    file.read_to_end(&mut bytes).map_err(|e| {
        warn!(path = %path.display(), error = %e, "read file failed");
        not_found(e)
    })?;

    debug!(path = %path.display(), bytes = bytes.len(), "encoded image");
    Ok(encode_bytes(&bytes))
}
