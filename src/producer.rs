//! Single-shot production of a fixed request body.
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

/// Wraps one immutable byte buffer known in advance as a producible request
/// body.
///
/// The whole buffer is handed to the transport in a single write: polling the
/// stream yields the payload once and then ends, so production is complete
/// before anything could pause or stop it, and it happens exactly once per
/// outbound request.  Directly usable with `reqwest::Body::wrap_stream`.
#[derive(Debug, Clone)]
pub struct FixedBody {
    payload: Bytes,
    produced: bool,
}

impl FixedBody {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            produced: false,
        }
    }

    /// Length of the body in bytes, stable across production.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }
}

impl Stream for FixedBody {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.produced {
            Poll::Ready(None)
        } else {
            this.produced = true;
            Poll::Ready(Some(Ok(this.payload.clone())))
        }
    }
}
