//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `OcrClient` over
//! real HTTP through the ureq transport, in both wire formats and through
//! the failure paths the caller has to tell apart.

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use ocr_core::{ClientConfig, OcrClient, OcrError, TransportError, WireFormat};

const APPCODE: &str = "integration-appcode";

fn start_mock_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, APPCODE).await
        })
        .unwrap();
    });

    addr
}

/// Serve canned HTTP responses over a plain socket, one per connection
/// (the last one repeats), recording every request received.
fn start_raw_server(responses: Vec<&'static [u8]>) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let requests = Arc::clone(&seen);

    std::thread::spawn(move || {
        for (i, stream) in listener.incoming().enumerate() {
            let mut stream = stream.unwrap();
            let request = read_request(&mut stream);
            requests.lock().unwrap().push(request);
            let reply = responses[i.min(responses.len() - 1)];
            stream.write_all(reply).unwrap();
            stream.flush().unwrap();
        }
    });

    (addr, seen)
}

fn read_request(stream: &mut std::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut byte = [0u8; 1];
    while !raw.ends_with(b"\r\n\r\n") {
        if stream.read(&mut byte).unwrap() == 0 {
            break;
        }
        raw.push(byte[0]);
    }
    let head = String::from_utf8_lossy(&raw).to_ascii_lowercase();
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .map_or(0, |v| v.trim().parse::<usize>().unwrap());
    let mut body = vec![0u8; length];
    stream.read_exact(&mut body).unwrap();
    raw.extend_from_slice(&body);
    String::from_utf8_lossy(&raw).into_owned()
}

fn endpoint(addr: SocketAddr) -> String {
    format!("http://{addr}{}", mock_server::IDCARD_PATH)
}

fn image_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"\xFF\xD8\xFF\xE0 fake jpeg").unwrap();
    file
}

#[test]
fn recognize_current_format() {
    let url = endpoint(start_mock_server());
    let client = OcrClient::default();
    let image = image_file();

    let body = client
        .recognize(&url, APPCODE, image.path(), r#"{"side":"back"}"#, WireFormat::Current)
        .unwrap();
    let result: mock_server::Recognition = serde_json::from_str(&body).unwrap();
    assert!(result.success);
    assert_eq!(result.side, "back");
    assert_eq!(result.image_size, 14);
}

#[test]
fn recognize_legacy_format() {
    let url = endpoint(start_mock_server());
    let client = OcrClient::default();
    let image = image_file();

    let body = client
        .recognize(&url, APPCODE, image.path(), "", WireFormat::Legacy)
        .unwrap();
    let wrapped: mock_server::LegacyResponse = serde_json::from_str(&body).unwrap();
    let inner: mock_server::Recognition =
        serde_json::from_str(&wrapped.outputs[0].output_value.data_value).unwrap();
    assert_eq!(inner.side, "face");
}

#[test]
fn post_exposes_status_line_and_headers() {
    let url = endpoint(start_mock_server());
    let client = OcrClient::default();

    let resp = client.post(&url, APPCODE, r#"{"image":"aGVsbG8="}"#).unwrap();
    assert_eq!(resp.status, 200);
    let head = resp.header_text();
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"), "{head}");
    assert!(head.ends_with("\r\n\r\n"));
    assert!(head.to_ascii_lowercase().contains("content-type: application/json"));
    assert!(resp.body_text().starts_with('{'));
}

#[test]
fn wrong_appcode_is_an_inspectable_status_error() {
    let url = endpoint(start_mock_server());
    let client = OcrClient::default();
    let image = image_file();

    let err = client
        .recognize(&url, "wrong", image.path(), "", WireFormat::Current)
        .unwrap_err();
    match err {
        OcrError::HttpStatus(e) => {
            assert_eq!(e.status, 401);
            assert!(e.headers.contains("x-ca-error-message: Invalid AppCode"), "{}", e.headers);
            assert_eq!(e.body, "Invalid AppCode");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn session_is_reused_across_requests() {
    let url = endpoint(start_mock_server());
    let client = OcrClient::default();
    for _ in 0..5 {
        let resp = client.post(&url, APPCODE, r#"{"image":"aGVsbG8="}"#).unwrap();
        assert!(resp.check_status().is_ok());
    }
}

#[test]
fn response_limit_fails_instead_of_truncating() {
    let url = endpoint(start_mock_server());
    let client = OcrClient::new(ClientConfig::default().response_limit(16));

    let err = client.post(&url, APPCODE, r#"{"image":"aGVsbG8="}"#).unwrap_err();
    assert!(matches!(err, TransportError::AllocationFailure { limit: Some(16), .. }));
}

#[test]
fn connection_refused_is_a_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = OcrClient::default();
    let err = client.post(&endpoint(addr), APPCODE, "{}").unwrap_err();
    assert!(matches!(err, TransportError::TransportFailure(_)));
}

#[test]
fn missing_image_never_reaches_the_network() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = OcrClient::default();
    let err = client
        .recognize(&endpoint(addr), APPCODE, "/no/such/image.jpg", "", WireFormat::Current)
        .unwrap_err();
    assert!(matches!(err, OcrError::Encode(_)));
}

#[test]
fn redirect_is_returned_not_followed() {
    const FOUND: &[u8] = b"HTTP/1.1 302 Found\r\nLocation: /other\r\n\
        Content-Length: 5\r\nConnection: close\r\n\r\nmoved";
    const OTHER: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok";
    let (addr, seen) = start_raw_server(vec![FOUND, OTHER]);
    let client = OcrClient::default();

    let resp = client.post(&endpoint(addr), APPCODE, r#"{"image":"aGk="}"#).unwrap();
    assert_eq!(resp.status, 302);
    assert_eq!(resp.body_text(), "moved");
    assert!(resp.header_text().contains("location: /other\r\n"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].starts_with("POST /rest/160601/ocr/ocr_idcard.json HTTP/1.1\r\n"));
    assert!(seen[0].ends_with(r#"{"image":"aGk="}"#));
}

#[test]
fn encoded_body_is_passed_through_untouched() {
    const GZIPPED: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\n\
        Content-Length: 4\r\nConnection: close\r\n\r\n\x1f\x8b\x08\x00";
    let (addr, seen) = start_raw_server(vec![GZIPPED]);
    let client = OcrClient::default();

    let resp = client.post(&endpoint(addr), APPCODE, "{}").unwrap();
    assert_eq!(resp.status, 200);
    assert!(resp.header_text().contains("content-encoding: gzip\r\n"));
    assert!(resp.header_text().contains("content-length: 4\r\n"));
    assert_eq!(resp.body(), b"\x1f\x8b\x08\x00");

    let seen = seen.lock().unwrap();
    assert!(!seen[0].to_ascii_lowercase().contains("gzip"), "{}", seen[0]);
}
