//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Every fallible call returns a heap-allocated `FfiOcrResult`. Payloads
//! cross as owned, length-counted byte buffers and error text as C strings;
//! the caller releases the whole envelope with `ocr_free_result`.
//! Conversion helpers live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use ocr_core::error::{EncodeError, HttpStatusError, OcrError, TransportError};

/// Opaque handle to an `OcrClient` session.
pub struct FfiOcrClient {
    pub(crate) inner: ocr_core::OcrClient,
}

/// Error codes returned in `FfiOcrResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    FileNotFound = 1,
    Serialization = 2,
    Transport = 3,
    AllocationFailure = 4,
    HttpStatus = 5,
    Panic = 6,
    NullArg = 7,
}

/// Result envelope for every fallible call.
///
/// On success `error_code` is `Ok`, `error_message` is null and `body`
/// holds the payload (base64 text, a JSON request body, or a response body).
/// On `HttpStatus`, `http_status`, `headers` and `body` describe the
/// response. Other failures carry only `error_message`.
///
/// `headers` and `body` hold the bytes exactly as received, followed by a
/// NUL terminator that is not counted in `headers_len` / `body_len`. A
/// payload may itself contain NUL bytes, so binary-safe callers read by
/// length rather than as a C string.
#[repr(C)]
pub struct FfiOcrResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub headers: *mut c_char,
    pub headers_len: usize,
    pub body: *mut c_char,
    pub body_len: usize,
}

/// Copy an error message into a C string, dropping interior NUL bytes.
pub(crate) fn to_c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    let mut bytes = s.into();
    bytes.retain(|&b| b != 0);
    CString::new(bytes).unwrap_or_default().into_raw()
}

/// Hand `bytes` to C unchanged, plus a trailing NUL. Returns the pointer
/// and the payload length without the terminator.
pub(crate) fn to_c_bytes(bytes: Vec<u8>) -> (*mut c_char, usize) {
    let len = bytes.len();
    let mut bytes = bytes;
    bytes.push(0);
    let raw = Box::into_raw(bytes.into_boxed_slice());
    (raw.cast::<c_char>(), len)
}

/// Release a buffer produced by `to_c_bytes`.
///
/// # Safety
/// `ptr` and `len` must come from the same `to_c_bytes` call, and the
/// buffer must not be freed twice.
pub(crate) unsafe fn free_c_bytes(ptr: *mut c_char, len: usize) {
    let slice = std::ptr::slice_from_raw_parts_mut(ptr.cast::<u8>(), len + 1);
    drop(unsafe { Box::from_raw(slice) });
}

impl FfiOcrResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: Option<String>,
        http_status: u16,
        headers: Option<Vec<u8>>,
        body: Option<Vec<u8>>,
    ) -> *mut Self {
        let (headers, headers_len) = headers.map_or((std::ptr::null_mut(), 0), to_c_bytes);
        let (body, body_len) = body.map_or((std::ptr::null_mut(), 0), to_c_bytes);
        let result = Box::new(FfiOcrResult {
            error_code,
            error_message: error_message.map_or(std::ptr::null_mut(), to_c_string),
            http_status,
            headers,
            headers_len,
            body,
            body_len,
        });
        Box::into_raw(result)
    }

    /// Success carrying `body`.
    pub(crate) fn ok(body: String) -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, None, 0, None, Some(body.into_bytes()))
    }

    /// Success for a 200 response, keeping its header block.
    pub(crate) fn ok_response(status: u16, headers: Vec<u8>, body: Vec<u8>) -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, None, status, Some(headers), Some(body))
    }

    /// A completed exchange with a status other than 200.
    pub(crate) fn status_response(status: u16, headers: Vec<u8>, body: Vec<u8>) -> *mut Self {
        Self::boxed(
            FfiErrorCode::HttpStatus,
            Some(format!("http code: {status}")),
            status,
            Some(headers),
            Some(body),
        )
    }

    pub(crate) fn from_status(err: HttpStatusError) -> *mut Self {
        let msg = err.to_string();
        Self::boxed(
            FfiErrorCode::HttpStatus,
            Some(msg),
            err.status,
            Some(err.headers.into_bytes()),
            Some(err.body.into_bytes()),
        )
    }

    pub(crate) fn from_transport(err: TransportError) -> *mut Self {
        let code = match err {
            TransportError::TransportFailure(_) => FfiErrorCode::Transport,
            TransportError::AllocationFailure { .. } => FfiErrorCode::AllocationFailure,
        };
        Self::boxed(code, Some(err.to_string()), 0, None, None)
    }

    pub(crate) fn from_encode(err: EncodeError) -> *mut Self {
        Self::boxed(FfiErrorCode::FileNotFound, Some(err.to_string()), 0, None, None)
    }

    pub(crate) fn from_error(err: OcrError) -> *mut Self {
        match err {
            OcrError::Encode(e) => Self::from_encode(e),
            e @ OcrError::Serialization(_) => {
                Self::boxed(FfiErrorCode::Serialization, Some(e.to_string()), 0, None, None)
            }
            OcrError::Transport(e) => Self::from_transport(e),
            OcrError::HttpStatus(e) => Self::from_status(e),
        }
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        let msg = format!("null argument: {name}");
        Self::boxed(FfiErrorCode::NullArg, Some(msg), 0, None, None)
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, Some(msg.to_string()), 0, None, None)
    }
}
