//! JSON request bodies for the OCR endpoint.
//!
//! # Design
//! The service accepts two schemas. `WireFormat::Current` is a flat object;
//! `WireFormat::Legacy` wraps every value in a typed-field envelope and nests
//! it under a single-element `inputs` array. Both are plain serde structs so
//! the key order is fixed by field order: `configure` before `image`,
//! `dataType` before `dataValue`. That order matches what the service has
//! always received and keeps output byte-identical for identical inputs.

use serde::Serialize;

use crate::error::OcrError;

/// Type tag the legacy schema uses for string values.
pub const LEGACY_STRING_TYPE: u32 = 50;

/// Which request schema to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// `{"configure": ..., "image": ...}`
    #[default]
    Current,
    /// `{"inputs": [{"configure": {"dataType": 50, ...}, "image": {...}}]}`
    Legacy,
}

impl WireFormat {
    /// Map the service's "use new format" switch onto a variant.
    pub fn from_flag(use_new_format: bool) -> Self {
        if use_new_format {
            WireFormat::Current
        } else {
            WireFormat::Legacy
        }
    }
}

/// A typed-field envelope from the legacy schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedValue<'a> {
    #[serde(rename = "dataType")]
    pub data_type: u32,
    #[serde(rename = "dataValue")]
    pub data_value: &'a str,
}

impl<'a> TypedValue<'a> {
    pub fn string(value: &'a str) -> Self {
        Self {
            data_type: LEGACY_STRING_TYPE,
            data_value: value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configure: Option<&'a str>,
    pub image: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyInput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configure: Option<TypedValue<'a>>,
    pub image: TypedValue<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyBody<'a> {
    pub inputs: Vec<LegacyInput<'a>>,
}

/// A request body in one of the two schemas, borrowing its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequestBody<'a> {
    Current(CurrentBody<'a>),
    Legacy(LegacyBody<'a>),
}

impl<'a> RequestBody<'a> {
    /// Build the body for `format`. An empty `configure` is omitted entirely.
    pub fn new(image: &'a str, configure: &'a str, format: WireFormat) -> Self {
        let configure = (!configure.is_empty()).then_some(configure);
        match format {
            WireFormat::Current => RequestBody::Current(CurrentBody { configure, image }),
            WireFormat::Legacy => RequestBody::Legacy(LegacyBody {
                inputs: vec![LegacyInput {
                    configure: configure.map(TypedValue::string),
                    image: TypedValue::string(image),
                }],
            }),
        }
    }

    pub fn to_json(&self) -> Result<String, OcrError> {
        serde_json::to_string(self).map_err(|e| OcrError::Serialization(e.to_string()))
    }
}

/// Serialize the request body for `format`.
pub fn compose(image: &str, configure: &str, format: WireFormat) -> Result<String, OcrError> {
    RequestBody::new(image, configure, format).to_json()
}
