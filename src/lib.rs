//! A Rust implementation of the JSON-RPC protocol, covering both the 1.0 and
//! 2.0 wire dialects, together with an HTTP client proxy built on it.
//!
//! The crate splits into a protocol core and a thin client:
//!
//! * the codec — [`encode_request`], [`decode_request`], [`encode_response`],
//!   [`decode_response`]: pure functions enforcing each dialect's framing
//!   rules and validating untrusted wire input into typed values or
//!   structured [`RpcError`]s.
//! * [`Proxy`] — issues one call per HTTP POST exchange: encode, produce the
//!   request body, accumulate the streamed response body, decode.  The HTTP
//!   layer itself is an injected capability; the proxy never opens sockets.
//!
//! There is deliberately no server-side routing here: decoding hands a
//! dispatch layer a validated [`Request`] (or an error that still carries the
//! correlation id to answer to), and encoding turns the dispatch outcome back
//! into wire text.  Batch requests are not supported.

mod body;
mod client;
mod codec;
mod error;
mod producer;
#[cfg(test)]
pub mod testing;
mod types;

pub use body::{BodyReceiver, collect};
pub use client::{ByteStream, HttpCapability, Proxy};
pub use codec::{
    CallId, IdGenerator, RandomIds, decode_request, decode_response, encode_request,
    encode_request_with, encode_response,
};
pub use error::{Error, HandlerError, Result, RpcError};
pub use producer::FixedBody;
pub use types::{ErrorBody, ErrorCode, ID_MAX, ID_MIN, Id, JsonValue, Request, Version};
