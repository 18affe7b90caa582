use thiserror::Error;

use crate::types::{ErrorBody, ErrorCode, Id, JsonValue, Version};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A structured JSON-RPC protocol error.
///
/// Used both for validation failures raised while decoding untrusted wire
/// input and for error bodies received in a response.  Beyond the wire error
/// fields it carries whatever correlation context was recoverable at the
/// point of failure, so a dispatch layer can still address a properly framed
/// error response back to the right caller:
///
/// * `id` is attached when a well-shaped `id` was present in the input;
/// * `version` is the normalized version when the `jsonrpc` field had already
///   validated, and the 1.0 default otherwise.
#[derive(Debug, Clone, Error)]
#[error("{message} (code {})", .code.code())]
pub struct RpcError {
    /// Description of the error.
    pub message: String,
    /// Protocol error code; INTERNAL_ERROR unless explicitly classified.
    pub code: ErrorCode,
    /// Additional data, if any.
    pub data: Option<JsonValue>,
    /// Correlation id, once known.
    pub id: Option<Id>,
    /// Protocol version the failing exchange was speaking.
    pub version: Version,
}

impl RpcError {
    pub fn new(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            code,
            data: None,
            id: None,
            version: Version::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<Option<Id>>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// The wire error object for this error, without the correlation context.
    pub fn body(&self) -> ErrorBody {
        ErrorBody::new(self.code, self.message.clone(), self.data.clone())
    }
}

impl From<ErrorBody> for RpcError {
    fn from(body: ErrorBody) -> Self {
        Self {
            message: body.message,
            code: body.code,
            data: body.data,
            id: None,
            version: Version::default(),
        }
    }
}

/// An application-level failure raised by a method handler, to be folded into
/// the JSON-RPC error envelope by [`crate::codec::encode_response`].
///
/// The variant is the classification: there is no reflective probing of the
/// underlying error value, callers pick the variant that describes their
/// failure and the codec maps it onto the fixed taxonomy.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// The handler was invoked with arguments of the wrong shape or type.
    /// Maps to INVALID_PARAMS.
    #[error("{0}")]
    BadArguments(String),

    /// A failure carrying its own protocol error code (and optionally data).
    #[error("{message}")]
    Coded {
        code: i32,
        message: String,
        data: Option<JsonValue>,
    },

    /// Any other failure.  Maps to INTERNAL_ERROR.
    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    /// Classify this failure into a wire error body.
    pub fn error_body(&self) -> ErrorBody {
        match self {
            HandlerError::BadArguments(message) => ErrorBody::invalid_params(message.clone(), None),
            HandlerError::Coded { code, message, data } => {
                ErrorBody::new(ErrorCode::from(*code), message.clone(), data.clone())
            }
            HandlerError::Other(message) => ErrorBody::internal_error(message.clone(), None),
        }
    }
}

/// Errors surfaced by this crate.
///
/// Transport-layer failures are propagated as-is and never reinterpreted as
/// protocol errors; only failures that occur after a response body was
/// successfully decoded become [`Error::Rpc`].
#[derive(Debug, Error)]
pub enum Error {
    /// A protocol-level error: either inbound wire text failed validation, or
    /// the remote peer answered with an error body.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The HTTP exchange itself failed (connection refused, timeout, ...).
    #[error("http request failed")]
    Http(#[from] reqwest::Error),

    /// The response body stream failed partway through.
    #[error("error reading response body")]
    Body {
        #[source]
        source: std::io::Error,
    },

    /// The response carried neither a non-null `result` nor a non-null
    /// `error`.  A local contract violation, distinct from the reserved wire
    /// codes; it never appears on the wire.
    #[error("not a valid JSON-RPC response")]
    InvalidResponse,

    /// A successful result arrived but could not be deserialized into the
    /// type the caller asked for.
    #[error("error deserializing result into {type_name}")]
    DeserResult {
        #[source]
        source: serde_json::Error,
        type_name: &'static str,
        response: JsonValue,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rpc_error_defaults() {
        let err = RpcError::new("boom", ErrorCode::InternalError);
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.id, None);
        assert_eq!(err.version, Version::V1);
        assert_eq!(err.to_string(), "boom (code -32603)");
    }

    #[test]
    fn rpc_error_context_builders() {
        let err = RpcError::new("bad", ErrorCode::InvalidRequest)
            .with_id(Id::Number(7))
            .with_version(Version::V2);
        assert_eq!(err.id, Some(Id::Number(7)));
        assert_eq!(err.version, Version::V2);
        assert_eq!(err.body(), ErrorBody::invalid_request("bad"));
    }

    #[test]
    fn bad_arguments_classifies_as_invalid_params() {
        let body = HandlerError::BadArguments("takes 2 arguments".into()).error_body();
        assert_eq!(body.code, ErrorCode::InvalidParams);
        assert_eq!(body.message, "takes 2 arguments");
    }

    #[test]
    fn coded_failure_keeps_its_own_code() {
        let body = HandlerError::Coded {
            code: -32000,
            message: "application says no".into(),
            data: Some(json!([1, 2])),
        }
        .error_body();
        assert_eq!(body.code.code(), -32000);
        assert_eq!(body.data, Some(json!([1, 2])));
    }

    #[test]
    fn other_failure_defaults_to_internal_error() {
        let body = HandlerError::Other("disk on fire".into()).error_body();
        assert_eq!(body.code, ErrorCode::InternalError);
    }
}
