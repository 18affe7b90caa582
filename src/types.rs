//! Value types for the JSON-RPC 1.0/2.0 wire protocol.
//!
//! Unlike most Rust JSON-RPC implementations these types have to cover *two*
//! incompatible wire dialects: the pre-spec 1.0 framing (no version marker,
//! both `result` and `error` always present on responses) and the 2.0 framing
//! (`jsonrpc` marker, exactly one of `result`/`error`).  The framing rules
//! themselves live in [`crate::codec`]; this module only models the values.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export the reserved protocol error codes.
///
/// No need to re-invent this wheel; the `jsonrpsee-types` codes are exactly
/// the reserved integers the protocol defines, and serialize as plain
/// integers.
pub use jsonrpsee_types::error::ErrorCode;
pub use serde_json::Value as JsonValue;

/// Smallest id the auto-generator will coin.
pub const ID_MIN: u64 = 1;
/// Largest id the auto-generator will coin (32-bit signed maxint).
pub const ID_MAX: u64 = (1 << 31) - 1;

/// Protocol version of a message.
///
/// Version 1.0 messages carry no version marker on the wire; 2.0 messages
/// carry a `jsonrpc` field.  Requests spell it as the string `"2.0"` while
/// responses spell it as the number `2.0` — that asymmetry is deliberate
/// wire-compatible behavior, not an oversight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    /// JSON-RPC 1.0, the implied version when no marker is present.
    #[default]
    V1,
    /// JSON-RPC 2.0.
    V2,
}

impl Version {
    /// The version as the float the wire normalization rules produce.
    pub fn as_f64(self) -> f64 {
        match self {
            Version::V1 => 1.0,
            Version::V2 => 2.0,
        }
    }

    /// Normalize a wire `jsonrpc` field into a version.
    ///
    /// The field must be a JSON string or number convertible to a float;
    /// exactly `2.0` selects V2 and every other float falls back to V1.
    /// Returns `None` for any other JSON shape, which callers must treat as a
    /// validation failure rather than coercing.
    pub(crate) fn from_wire(raw: &JsonValue) -> Option<Version> {
        let float = match raw {
            JsonValue::String(s) => s.parse::<f64>().ok()?,
            JsonValue::Number(n) => n.as_f64()?,
            _ => return None,
        };

        if float == 2.0 {
            Some(Version::V2)
        } else {
            Some(Version::V1)
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.as_f64())
    }
}

/// Request id, linking a request to its eventual response.
#[derive(Debug, PartialEq, Clone, Hash, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Id {
    /// Null, used by responders when the request id could not be read.
    Null,
    /// Numeric id.
    Number(u64),
    /// String id.
    Str(String),
}

impl Id {
    /// Interpret a wire `id` value.  Anything other than null, an unsigned
    /// number, or a string is an invalid id shape.
    pub(crate) fn from_wire(raw: &JsonValue) -> Option<Id> {
        match raw {
            JsonValue::Null => Some(Id::Null),
            JsonValue::Number(n) => n.as_u64().map(Id::Number),
            JsonValue::String(s) => Some(Id::Str(s.clone())),
            _ => None,
        }
    }

    pub(crate) fn to_value(&self) -> JsonValue {
        match self {
            Id::Null => JsonValue::Null,
            Id::Number(n) => JsonValue::from(*n),
            Id::Str(s) => JsonValue::from(s.clone()),
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Null => write!(f, "null"),
            Id::Number(n) => write!(f, "{n}"),
            Id::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Id::Number(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::Str(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::Str(s)
    }
}

/// The wire error object carried in an error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Code
    pub code: ErrorCode,
    /// Message
    pub message: String,
    /// Optional data; omitted from the wire entirely when absent, never
    /// serialized as an explicit null.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<JsonValue>,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>, data: impl Into<Option<JsonValue>>) -> Self {
        Self {
            code,
            message: message.into(),
            data: data.into(),
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message, None)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message, None)
    }

    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MethodNotFound, message, None)
    }

    pub fn invalid_params(message: impl Into<String>, data: impl Into<Option<JsonValue>>) -> Self {
        Self::new(ErrorCode::InvalidParams, message, data)
    }

    pub fn internal_error(message: impl Into<String>, data: impl Into<Option<JsonValue>>) -> Self {
        Self::new(ErrorCode::InternalError, message, data)
    }

    pub fn server_error(code: i32, message: impl Into<String>, data: impl Into<Option<JsonValue>>) -> Self {
        Self::new(ErrorCode::ServerError(code), message, data)
    }

    /// Build the wire JSON for this body without going through serde.
    ///
    /// Infallible by construction, so the encoding path never has to deal
    /// with a serialization error it could not meaningfully report.
    pub(crate) fn to_wire_value(&self) -> JsonValue {
        let mut obj = serde_json::Map::new();
        obj.insert("code".into(), JsonValue::from(self.code.code()));
        obj.insert("message".into(), JsonValue::from(self.message.clone()));
        if let Some(data) = &self.data {
            obj.insert("data".into(), data.clone());
        }
        JsonValue::Object(obj)
    }
}

/// A decoded, validated JSON-RPC request.
///
/// Params are positional only; a request carrying named parameters fails
/// validation in [`crate::codec::decode_request`] rather than being coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Name of the method to be invoked.
    pub method: String,
    /// Positional arguments, unmodified.
    pub params: Vec<JsonValue>,
    /// Correlation id; `None` for a notification.
    pub id: Option<Id>,
    /// Normalized version; 1.0 when no marker was on the wire.
    pub version: Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn version_normalizes_strings_and_numbers() {
        assert_eq!(Version::from_wire(&json!("2.0")), Some(Version::V2));
        assert_eq!(Version::from_wire(&json!(2.0)), Some(Version::V2));
        assert_eq!(Version::from_wire(&json!(2)), Some(Version::V2));
        assert_eq!(Version::from_wire(&json!("1.0")), Some(Version::V1));
        assert_eq!(Version::from_wire(&json!(1.0)), Some(Version::V1));
        // Unknown floats fall back to 1.0 framing rather than failing
        assert_eq!(Version::from_wire(&json!(3.0)), Some(Version::V1));
    }

    #[test]
    fn version_rejects_other_shapes() {
        assert_eq!(Version::from_wire(&json!(["2.0"])), None);
        assert_eq!(Version::from_wire(&json!({"v": 2})), None);
        assert_eq!(Version::from_wire(&json!(true)), None);
        assert_eq!(Version::from_wire(&json!(null)), None);
        // A string that is not a number is not a version either
        assert_eq!(Version::from_wire(&json!("two point oh")), None);
    }

    #[test]
    fn id_from_wire_shapes() {
        assert_eq!(Id::from_wire(&json!(null)), Some(Id::Null));
        assert_eq!(Id::from_wire(&json!(7)), Some(Id::Number(7)));
        assert_eq!(Id::from_wire(&json!("abc")), Some(Id::Str("abc".into())));
        assert_eq!(Id::from_wire(&json!([1])), None);
        assert_eq!(Id::from_wire(&json!({"id": 1})), None);
        // Negative numbers don't fit the unsigned id space
        assert_eq!(Id::from_wire(&json!(-1)), None);
    }

    #[test]
    fn error_body_omits_absent_data() {
        let body = ErrorBody::invalid_request("bad");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({"code": -32600, "message": "bad"}));
        assert_eq!(value, body.to_wire_value());
    }

    #[test]
    fn error_body_includes_data_when_present() {
        let body = ErrorBody::internal_error("boom", json!({"detail": 42}));
        let value = body.to_wire_value();
        assert_eq!(
            value,
            json!({"code": -32603, "message": "boom", "data": {"detail": 42}})
        );
        assert_eq!(serde_json::to_value(&body).unwrap(), value);
    }

    #[test]
    fn error_body_round_trips() {
        let wire = json!({"code": -32601, "message": "no such method"});
        let body: ErrorBody = serde_json::from_value(wire).unwrap();
        assert_eq!(body.code, ErrorCode::MethodNotFound);
        assert_eq!(body.message, "no such method");
        assert_eq!(body.data, None);
    }
}
