//! Accumulation of a streamed response body into one complete buffer.
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tokio::sync::oneshot;

/// Accumulates body chunks in arrival order and signals completion exactly
/// once.
///
/// Two states: accumulating (initial) and finished (terminal).  The
/// completion signal is a one-shot channel handed out at construction; it is
/// structurally impossible for it to fire twice, and a second
/// [`BodyReceiver::stream_ended`] is a no-op.
pub struct BodyReceiver {
    body: BytesMut,
    // Consumed on the accumulating -> finished transition; doubles as the
    // state flag.
    finished: Option<oneshot::Sender<Bytes>>,
}

impl BodyReceiver {
    /// Create a receiver and the completion signal that will yield the full
    /// accumulated body once the stream ends.
    pub fn new() -> (Self, oneshot::Receiver<Bytes>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                body: BytesMut::new(),
                finished: Some(tx),
            },
            rx,
        )
    }

    /// Append a chunk.  Chunks arriving after the stream has ended are
    /// discarded.
    pub fn data_received(&mut self, chunk: &[u8]) {
        if self.finished.is_some() {
            self.body.extend_from_slice(chunk);
        }
    }

    /// Transition to finished, fulfilling the completion signal with the
    /// accumulated body.  Calling this again does nothing.
    pub fn stream_ended(&mut self) {
        if let Some(finished) = self.finished.take() {
            // The receiver may have been dropped; nobody to notify then.
            let _ = finished.send(self.body.split().freeze());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_none()
    }
}

/// Drive a [`BodyReceiver`] from a chunk stream until end-of-stream and hand
/// back the whole body.
///
/// A failed chunk aborts accumulation and propagates the stream's error
/// unchanged.
pub async fn collect<S, B, E>(mut stream: S) -> Result<Bytes, E>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    let (mut receiver, finished) = BodyReceiver::new();

    while let Some(chunk) = stream.next().await {
        receiver.data_received(chunk?.as_ref());
    }
    receiver.stream_ended();

    // The sender fired above, so the signal resolves immediately.
    Ok(finished.await.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[test]
    fn single_chunk_accumulates() {
        let (mut receiver, _finished) = BodyReceiver::new();
        receiver.data_received(b"some random string");
        assert_eq!(&receiver.body[..], b"some random string");
        assert!(!receiver.is_finished());
    }

    #[test]
    fn chunks_concatenate_in_arrival_order() {
        let (mut receiver, _finished) = BodyReceiver::new();
        receiver.data_received(b"ab");
        receiver.data_received(b"cd");
        assert_eq!(&receiver.body[..], b"abcd");
    }

    #[tokio::test]
    async fn stream_end_fires_completion_with_full_body() {
        let (mut receiver, finished) = BodyReceiver::new();
        receiver.data_received(b"ab");
        receiver.data_received(b"cd");
        receiver.stream_ended();

        assert!(receiver.is_finished());
        assert_eq!(finished.await.unwrap(), Bytes::from_static(b"abcd"));
    }

    #[tokio::test]
    async fn second_stream_end_is_a_no_op() {
        let (mut receiver, finished) = BodyReceiver::new();
        receiver.data_received(b"data");
        receiver.stream_ended();
        receiver.stream_ended();

        // The one-shot resolves exactly once, with the full buffer.
        assert_eq!(finished.await.unwrap(), Bytes::from_static(b"data"));
    }

    #[test]
    fn chunks_after_finish_are_dropped() {
        let (mut receiver, mut finished) = BodyReceiver::new();
        receiver.data_received(b"kept");
        receiver.stream_ended();
        receiver.data_received(b" dropped");

        assert_eq!(finished.try_recv().unwrap(), Bytes::from_static(b"kept"));
    }

    #[test]
    fn dropped_completion_receiver_is_tolerated() {
        let (mut receiver, finished) = BodyReceiver::new();
        drop(finished);
        receiver.data_received(b"x");
        receiver.stream_ended();
        assert!(receiver.is_finished());
    }

    #[tokio::test]
    async fn collect_concatenates_a_chunk_stream() {
        let chunks: Vec<Result<&[u8], std::io::Error>> = vec![Ok(b"ab"), Ok(b"cd"), Ok(b"ef")];
        let body = collect(stream::iter(chunks)).await.unwrap();
        assert_eq!(body, Bytes::from_static(b"abcdef"));
    }

    #[tokio::test]
    async fn collect_of_empty_stream_yields_empty_body() {
        let body = collect(stream::iter(
            Vec::<Result<&[u8], std::io::Error>>::new(),
        ))
        .await
        .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn collect_propagates_stream_errors() {
        let chunks: Vec<Result<&[u8], std::io::Error>> = vec![
            Ok(b"ab"),
            Err(std::io::Error::other("connection reset")),
        ];
        let err = collect(stream::iter(chunks)).await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }
}
