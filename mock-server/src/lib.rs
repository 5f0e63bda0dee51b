use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{info, warn};
use uuid::Uuid;

pub const IDCARD_PATH: &str = "/rest/160601/ocr/ocr_idcard.json";
pub const ERROR_HEADER: &str = "x-ca-error-message";
const STRING_TYPE: u32 = 50;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypedValue {
    #[serde(rename = "dataType")]
    pub data_type: u32,
    #[serde(rename = "dataValue")]
    pub data_value: String,
}

#[derive(Deserialize)]
struct LegacyInput {
    image: TypedValue,
    configure: Option<TypedValue>,
}

#[derive(Deserialize)]
struct LegacyRequest {
    inputs: Vec<LegacyInput>,
}

#[derive(Deserialize)]
struct CurrentRequest {
    image: String,
    configure: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OcrRequest {
    Legacy(LegacyRequest),
    Current(CurrentRequest),
}

#[derive(Deserialize, Default)]
struct Configure {
    side: Option<String>,
}

/// Recognition result returned for a well-formed request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recognition {
    pub request_id: Uuid,
    pub success: bool,
    pub side: String,
    pub image_size: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LegacyOutput {
    #[serde(rename = "outputLabel")]
    pub output_label: String,
    #[serde(rename = "outputMulti")]
    pub output_multi: serde_json::Value,
    #[serde(rename = "outputValue")]
    pub output_value: TypedValue,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LegacyResponse {
    pub outputs: Vec<LegacyOutput>,
}

#[derive(Clone)]
struct AppState {
    expected_auth: Arc<String>,
}

pub fn app(appcode: &str) -> Router {
    let state = AppState {
        expected_auth: Arc::new(format!("APPCODE {appcode}")),
    };
    Router::new()
        .route(IDCARD_PATH, post(recognize))
        .with_state(state)
}

pub async fn run(listener: TcpListener, appcode: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(appcode)).await
}

fn reject(status: StatusCode, message: &str) -> Response {
    warn!(%status, message, "rejecting request");
    (status, [(ERROR_HEADER, message.to_string())], message.to_string()).into_response()
}

async fn recognize(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == state.expected_auth.as_str());
    if !authorized {
        return reject(StatusCode::UNAUTHORIZED, "Invalid AppCode");
    }

    let request: OcrRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(_) => return reject(StatusCode::BAD_REQUEST, "Invalid Param"),
    };

    let (legacy, image, configure) = match request {
        OcrRequest::Current(r) => (false, r.image, r.configure),
        OcrRequest::Legacy(mut r) => {
            if r.inputs.len() != 1 {
                return reject(StatusCode::BAD_REQUEST, "Invalid Param");
            }
            let input = r.inputs.remove(0);
            let typed_ok = input.image.data_type == STRING_TYPE
                && input.configure.as_ref().is_none_or(|c| c.data_type == STRING_TYPE);
            if !typed_ok {
                return reject(StatusCode::BAD_REQUEST, "Invalid Param");
            }
            (true, input.image.data_value, input.configure.map(|c| c.data_value))
        }
    };

    let image = match STANDARD.decode(image.as_bytes()) {
        Ok(bytes) if !bytes.is_empty() => bytes,
        _ => return reject(StatusCode::BAD_REQUEST, "Invalid Image"),
    };
    let configure: Configure = match configure.as_deref() {
        None | Some("") => Configure::default(),
        Some(text) => match serde_json::from_str(text) {
            Ok(c) => c,
            Err(_) => return reject(StatusCode::BAD_REQUEST, "Invalid Configure"),
        },
    };

    let recognition = Recognition {
        request_id: Uuid::new_v4(),
        success: true,
        side: configure.side.unwrap_or_else(|| "face".to_string()),
        image_size: image.len(),
    };
    info!(request_id = %recognition.request_id, legacy, bytes = image.len(), "recognized");

    if !legacy {
        return (StatusCode::OK, Json(recognition)).into_response();
    }
    let document = match serde_json::to_string(&recognition) {
        Ok(d) => d,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    let response = LegacyResponse {
        outputs: vec![LegacyOutput {
            output_label: "ocr_id".to_string(),
            output_multi: serde_json::json!({}),
            output_value: TypedValue {
                data_type: STRING_TYPE,
                data_value: document,
            },
        }],
    };
    (StatusCode::OK, Json(response)).into_response()
}
