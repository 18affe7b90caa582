//! The client side of the protocol: one JSON-RPC call per HTTP POST exchange.
//!
//! The proxy does not open connections itself; it drives an injected
//! [`HttpCapability`] (out of the box, a `reqwest::Client`) and only deals in
//! "send these bytes, hand me back a chunk stream".  Connection
//! establishment, TLS, and chunked transfer all stay below that line.
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::body;
use crate::codec::{self, CallId, IdGenerator, RandomIds};
use crate::error::{Error, Result};
use crate::producer::FixedBody;
use crate::types::{JsonValue, Version};

/// The chunked response body an HTTP exchange yields.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// The HTTP client capability the proxy drives.
///
/// One call, one exchange: POST the request body to the URL and hand back the
/// response body as a stream of chunks.  Implementations must not interpret
/// the bytes in either direction.
#[async_trait]
pub trait HttpCapability: Send + Sync {
    async fn submit(&self, url: &Url, request: FixedBody) -> Result<ByteStream>;
}

#[async_trait]
impl HttpCapability for reqwest::Client {
    async fn submit(&self, url: &Url, request: FixedBody) -> Result<ByteStream> {
        // The producer knows its length up front, so the request goes out
        // with an explicit Content-Length instead of chunked encoding.
        let response = reqwest::Client::post(self, url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::CONTENT_LENGTH, request.len())
            .body(reqwest::Body::wrap_stream(request))
            .send()
            .await?;

        // The body is decoded regardless of HTTP status; servers answer
        // protocol errors with a JSON-RPC error body on non-2xx statuses too.
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other))
            .boxed())
    }
}

/// A JSON-RPC client proxy bound to one endpoint URL and protocol version.
///
/// Each [`Proxy::call`] is an independent exchange with its own request body
/// producer and body accumulator; the proxy itself holds nothing but static
/// configuration, so concurrent calls on one instance (it is cheap to clone)
/// never contend.
#[derive(Clone)]
pub struct Proxy {
    http: Arc<dyn HttpCapability>,
    url: Url,
    version: Version,
    ids: Arc<dyn IdGenerator>,
}

impl Proxy {
    /// A proxy speaking `version` against `url` over a default
    /// `reqwest::Client`.
    pub fn new(url: Url, version: Version) -> Self {
        Self::with_capability(url, version, Arc::new(reqwest::Client::new()))
    }

    /// A proxy over an injected HTTP capability.
    pub fn with_capability(url: Url, version: Version, http: Arc<dyn HttpCapability>) -> Self {
        Self {
            http,
            url,
            version,
            ids: Arc::new(RandomIds),
        }
    }

    /// Replace the request id source.  Production proxies keep the default
    /// random generator; tests inject a deterministic one.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Call a remote method with positional arguments, yielding the raw JSON
    /// result.
    ///
    /// A fresh correlation id is generated per call.  HTTP-layer failures
    /// propagate as [`Error::Http`]/[`Error::Body`] unchanged; an error body
    /// in the response surfaces as [`Error::Rpc`]; a response carrying
    /// neither result nor error fails with [`Error::InvalidResponse`].
    pub async fn call_raw(&self, method: &str, args: Vec<JsonValue>) -> Result<JsonValue> {
        let wire = codec::encode_request_with(
            method,
            args,
            CallId::Generate,
            self.version,
            self.ids.as_ref(),
        );
        debug!(method, url = %self.url, version = %self.version, "issuing JSON-RPC call");

        let body = self.exchange(wire).await?;
        let text = std::str::from_utf8(&body).map_err(|_| Error::InvalidResponse)?;
        let result = codec::decode_response(text)?;

        debug!(method, "JSON-RPC call completed");
        Ok(result)
    }

    /// Call a remote method, deserializing the result into `Resp`.
    pub async fn call<Resp>(&self, method: &str, args: Vec<JsonValue>) -> Result<Resp>
    where
        Resp: DeserializeOwned,
    {
        let response = self.call_raw(method, args).await?;
        serde_json::from_value(response.clone()).map_err(|e| Error::DeserResult {
            source: e,
            type_name: std::any::type_name::<Resp>(),
            response,
        })
    }

    /// Send a notification: no id goes out, and whatever the server sends
    /// back is read to completion and discarded.
    ///
    /// A successful return only means the exchange completed; there is no way
    /// to know how the remote peer processed the notification, if at all.
    pub async fn notify(&self, method: &str, args: Vec<JsonValue>) -> Result<()> {
        let wire = codec::encode_request(method, args, CallId::Notification, self.version);
        debug!(method, url = %self.url, "sending JSON-RPC notification");

        self.exchange(wire).await?;
        Ok(())
    }

    /// One full HTTP exchange: produce the request body, collect the streamed
    /// response body into a single buffer.
    async fn exchange(&self, wire: String) -> Result<Bytes> {
        let request = FixedBody::new(wire);
        let response = self.http.submit(&self.url, request).await?;
        body::collect(response)
            .await
            .map_err(|source| Error::Body { source })
    }
}
