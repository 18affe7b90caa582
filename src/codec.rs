//! Pure encode/decode operations for JSON-RPC 1.0 and 2.0 wire messages.
//!
//! These four functions are the protocol core: they are synchronous, do no
//! I/O, and never mutate their inputs.  The only non-determinism is the
//! auto-generated request id, which goes through an injected [`IdGenerator`]
//! so tests can pin it down.
//!
//! Validation of inbound wire text is defensive and exhaustive: every field
//! shape is matched explicitly, and a violation surfaces as a typed
//! [`RpcError`] carrying whatever correlation context (id, version) was
//! already recoverable, never as a panic or a silent coercion.
use rand::Rng;
use serde_json::Map;
use tracing::debug;

use crate::error::{Error, HandlerError, Result, RpcError};
use crate::types::{ErrorBody, ErrorCode, Id, JsonValue, Request, Version};

pub use crate::types::{ID_MAX, ID_MIN};

/// Where the correlation id of an outgoing request comes from.
#[derive(Debug, Clone, Default)]
pub enum CallId {
    /// Omit the id entirely; the request is a notification and no response is
    /// expected.
    Notification,
    /// Coin a fresh id uniformly in `[ID_MIN, ID_MAX]`.
    #[default]
    Generate,
    /// Caller-supplied id, used unchanged.
    Explicit(Id),
}

/// Source of auto-generated request ids.
///
/// Implementations must return ids within `[ID_MIN, ID_MAX]`.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> u64;
}

/// The production id source: a uniformly random id per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> u64 {
        rand::rng().random_range(ID_MIN..=ID_MAX)
    }
}

/// Encode a request (or notification) into wire text, drawing any generated
/// id from [`RandomIds`].
///
/// `args` are the positional parameters, emitted unmodified; packing the
/// arguments is up to the caller.  Version 2.0 adds the `"jsonrpc": "2.0"`
/// marker, version 1.0 omits it.
pub fn encode_request(method: &str, args: Vec<JsonValue>, id: CallId, version: Version) -> String {
    encode_request_with(method, args, id, version, &RandomIds)
}

/// [`encode_request`] with an explicit id source.
pub fn encode_request_with(
    method: &str,
    args: Vec<JsonValue>,
    id: CallId,
    version: Version,
    ids: &dyn IdGenerator,
) -> String {
    let mut request = Map::new();
    request.insert("method".into(), JsonValue::from(method));
    request.insert("params".into(), JsonValue::Array(args));

    match id {
        CallId::Notification => {}
        CallId::Generate => {
            request.insert("id".into(), JsonValue::from(ids.next_id()));
        }
        CallId::Explicit(id) => {
            request.insert("id".into(), id.to_value());
        }
    }

    if version == Version::V2 {
        request.insert("jsonrpc".into(), JsonValue::from("2.0"));
    }

    JsonValue::Object(request).to_string()
}

/// Decode and validate wire text as a JSON-RPC request.
///
/// Fails with PARSE_ERROR when the text is not JSON at all, and with
/// INVALID_REQUEST when it is JSON but violates the shape rules for
/// `jsonrpc`, `method`, `params`, or `id`.  An INVALID_REQUEST failure
/// carries the request's id (when well-shaped) and its normalized version
/// (when the `jsonrpc` field had already validated), so the dispatch layer
/// can still frame a correctly addressed error response.
pub fn decode_request(wire: &str) -> Result<Request, RpcError> {
    let decoded: JsonValue = serde_json::from_str(wire).map_err(|e| {
        debug!(error = %e, "inbound request is not parseable JSON");
        RpcError::new("Failed to parse JSON", ErrorCode::ParseError)
    })?;

    let JsonValue::Object(decoded) = decoded else {
        return Err(RpcError::new(
            "Request is not a JSON object",
            ErrorCode::InvalidRequest,
        ));
    };

    // Context for validation failures: a malformed id contributes nothing.
    let context_id = decoded.get("id").and_then(Id::from_wire);

    // The version marker is only present on 2.0 requests.
    let version = match decoded.get("jsonrpc") {
        None => Version::V1,
        Some(raw) => Version::from_wire(raw).ok_or_else(|| {
            RpcError::new("Invalid jsonrpc type", ErrorCode::InvalidRequest).with_id(context_id.clone())
        })?,
    };

    let invalid = |message: &str| {
        RpcError::new(message, ErrorCode::InvalidRequest)
            .with_id(context_id.clone())
            .with_version(version)
    };

    let method = match decoded.get("method") {
        Some(JsonValue::String(method)) => method.clone(),
        _ => return Err(invalid("Invalid method type")),
    };

    // Named parameters (a mapping) are explicitly unsupported.
    let params = match decoded.get("params") {
        Some(JsonValue::Array(params)) => params.clone(),
        _ => return Err(invalid("Invalid params type")),
    };

    let id = match decoded.get("id") {
        None => None,
        Some(raw) => match Id::from_wire(raw) {
            Some(id) => Some(id),
            None => return Err(invalid("Invalid id type")),
        },
    };

    Ok(Request {
        method,
        params,
        id,
        version,
    })
}

/// Encode the outcome of a method call into response wire text.
///
/// A failed outcome is classified into an error body by
/// [`HandlerError::error_body`].  Version 1.0 responses always carry both
/// `result` and `error` keys with the unused one an explicit null; 2.0
/// responses carry exactly one of them plus the numeric `"jsonrpc": 2.0`
/// marker.
pub fn encode_response(outcome: Result<JsonValue, HandlerError>, id: Id, version: Version) -> String {
    let mut response = Map::new();
    response.insert("id".into(), id.to_value());

    if version == Version::V2 {
        response.insert("jsonrpc".into(), JsonValue::from(version.as_f64()));
    }

    match outcome {
        Err(failure) => {
            response.insert("error".into(), failure.error_body().to_wire_value());
            if version == Version::V1 {
                response.insert("result".into(), JsonValue::Null);
            }
        }
        Ok(result) => {
            response.insert("result".into(), result);
            if version == Version::V1 {
                response.insert("error".into(), JsonValue::Null);
            }
        }
    }

    JsonValue::Object(response).to_string()
}

/// Decode response wire text into the success payload.
///
/// Returns the `result` value when one is present and non-null.  A non-null
/// `error` fails with [`Error::Rpc`] surfacing the error body along with the
/// response's id and version.  Anything else — unparseable text, a non-object,
/// or a response with neither field populated — fails with
/// [`Error::InvalidResponse`], the client's own contract violation rather
/// than a wire-level code.
pub fn decode_response(wire: &str) -> Result<JsonValue> {
    let Ok(JsonValue::Object(response)) = serde_json::from_str::<JsonValue>(wire) else {
        return Err(Error::InvalidResponse);
    };

    if let Some(result) = response.get("result")
        && !result.is_null()
    {
        return Ok(result.clone());
    }

    if let Some(error) = response.get("error")
        && !error.is_null()
    {
        let mut rpc_error = error_from_wire(error);
        rpc_error.id = response.get("id").and_then(Id::from_wire);
        if let Some(version) = response.get("jsonrpc").and_then(Version::from_wire) {
            rpc_error.version = version;
        }
        debug!(code = rpc_error.code.code(), id = ?rpc_error.id, "decoded error response");
        return Err(Error::Rpc(rpc_error));
    }

    Err(Error::InvalidResponse)
}

/// Interpret a wire `error` value.
///
/// A well-formed error object maps onto [`ErrorBody`]; 1.0 peers were allowed
/// to put any JSON value there, so anything else degrades to an
/// INTERNAL_ERROR whose message is the value's JSON text.
fn error_from_wire(error: &JsonValue) -> RpcError {
    match serde_json::from_value::<ErrorBody>(error.clone()) {
        Ok(body) => body.into(),
        Err(_) => RpcError::new(error.to_string(), ErrorCode::InternalError),
    }
}
