//! C-ABI wrapper around `ocr-core`.
//!
//! # Overview
//! Exposes encoding, request composition and the authenticated POST through
//! `extern "C"` functions so C and C++ callers can use the client without
//! linking against Rust types directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - One `FfiOcrResult` envelope conveys payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `ocr_*_free` function to release them.

pub mod types;

use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use ocr_core::{ClientConfig, OcrClient, WireFormat};

use types::*;

/// Borrow a C string as UTF-8, replacing invalid sequences.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated string that
/// outlives the returned value.
unsafe fn read_str<'a>(ptr: *const c_char) -> Cow<'a, str> {
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create an OCR client session. Reuse it for every request and free it
/// with `ocr_client_free`.
///
/// `verify_tls` should be true unless the endpoint is a trusted test host.
/// Returns null if an internal panic occurs.
#[unsafe(no_mangle)]
pub extern "C" fn ocr_client_new(verify_tls: bool) -> *mut FfiOcrClient {
    catch_unwind(AssertUnwindSafe(|| {
        let config = ClientConfig::default().verify_tls(verify_tls);
        let client = OcrClient::new(config);
        Box::into_raw(Box::new(FfiOcrClient { inner: client }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `ocr_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ocr_client_free(client: *mut FfiOcrClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Encode / compose
// ---------------------------------------------------------------------------

/// Read the file at `path` and return its base64 text in `body`.
///
/// Fails with `FileNotFound` if the file cannot be read.
#[unsafe(no_mangle)]
pub extern "C" fn ocr_encode_file(path: *const c_char) -> *mut FfiOcrResult {
    catch_unwind(|| {
        if path.is_null() {
            return FfiOcrResult::null_arg("path");
        }
        let path = unsafe { read_str(path) };
        match ocr_core::encode_file(&*path) {
            Ok(encoded) => FfiOcrResult::ok(encoded),
            Err(e) => FfiOcrResult::from_encode(e),
        }
    })
    .unwrap_or_else(|_| FfiOcrResult::panic("panic in ocr_encode_file"))
}

/// Compose a request body. `configure` may be null or empty to omit it.
/// `use_new_format` selects the flat schema; false selects the legacy
/// `inputs` schema.
#[unsafe(no_mangle)]
pub extern "C" fn ocr_compose(
    image: *const c_char,
    configure: *const c_char,
    use_new_format: bool,
) -> *mut FfiOcrResult {
    catch_unwind(|| {
        if image.is_null() {
            return FfiOcrResult::null_arg("image");
        }
        let image = unsafe { read_str(image) };
        let configure = if configure.is_null() {
            Cow::Borrowed("")
        } else {
            unsafe { read_str(configure) }
        };
        match ocr_core::compose(&image, &configure, WireFormat::from_flag(use_new_format)) {
            Ok(body) => FfiOcrResult::ok(body),
            Err(e) => FfiOcrResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiOcrResult::panic("panic in ocr_compose"))
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// POST `body` to `url` with `Authorization: APPCODE <appcode>`.
///
/// On 200 the result is `Ok` with `headers` and `body` set. Any other
/// status yields `HttpStatus` with `http_status`, `headers` and `body` set.
/// Both carry the received bytes unaltered; see `headers_len` / `body_len`.
#[unsafe(no_mangle)]
pub extern "C" fn ocr_post(
    client: *const FfiOcrClient,
    url: *const c_char,
    appcode: *const c_char,
    body: *const c_char,
) -> *mut FfiOcrResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiOcrResult::null_arg("client");
        }
        if url.is_null() {
            return FfiOcrResult::null_arg("url");
        }
        if appcode.is_null() {
            return FfiOcrResult::null_arg("appcode");
        }
        if body.is_null() {
            return FfiOcrResult::null_arg("body");
        }
        let client = unsafe { &*client };
        let (url, appcode, body) = unsafe { (read_str(url), read_str(appcode), read_str(body)) };

        let response = match client.inner.post(&url, &appcode, &body) {
            Ok(r) => r,
            Err(e) => return FfiOcrResult::from_transport(e),
        };
        let headers = response.headers().to_vec();
        let body = response.body().to_vec();
        if response.is_ok() {
            FfiOcrResult::ok_response(response.status, headers, body)
        } else {
            FfiOcrResult::status_response(response.status, headers, body)
        }
    }))
    .unwrap_or_else(|_| FfiOcrResult::panic("panic in ocr_post"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a result returned by any `ocr_*` call. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ocr_free_result(result: *mut FfiOcrResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        for (ptr, len) in [
            (result.headers, result.headers_len),
            (result.body, result.body_len),
        ] {
            if !ptr.is_null() {
                unsafe { free_c_bytes(ptr, len) };
            }
        }
    }));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
