//! Streaming response bodies and the consumers that read them.
//!
//! A successful call hands its body to a consumer as a [`ByteStream`]: chunks
//! arrive as the server sends them, nothing is buffered up front. What the
//! call returns is decided by the consumer, which is picked at the call site
//! through the result type:
//!
//! | Result type | Reads the body as |
//! |---|---|
//! | [`Json<T>`] | a JSON document deserialized into `T` |
//! | `String` | text, honouring the [`ResponseEncoding`] hint |
//! | [`Bytes`] / `Vec<u8>` | raw bytes |
//! | `()` | nothing; the body is drained and discarded |
//! | [`ByteStream`] | the live stream, handed back to the caller |

use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, BoxStream};
use futures_util::{Stream, StreamExt, TryStreamExt};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::error::{LookerError, Result};
use crate::settings::ResponseEncoding;

// ---------------------------------------------------------------------------
// ByteStream
// ---------------------------------------------------------------------------

/// Sequential byte source over a response body.
pub struct ByteStream {
    inner: Option<BoxStream<'static, Result<Bytes>>>,
    cancelled: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
    status: StatusCode,
    headers: HeaderMap,
    encoding: ResponseEncoding,
}

impl std::fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStream")
            .field("status", &self.status)
            .field("encoding", &self.encoding)
            .field("finished", &self.inner.is_none())
            .finish_non_exhaustive()
    }
}

impl ByteStream {
    /// Wrap a live `reqwest` response.
    pub(crate) fn from_response(
        resp: reqwest::Response,
        encoding: ResponseEncoding,
        cancel: Option<CancellationToken>,
    ) -> Self {
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes_stream().map_err(LookerError::from).boxed();
        Self {
            inner: Some(body),
            cancelled: cancel.map(|t| Box::pin(t.cancelled_owned())),
            status,
            headers,
            encoding,
        }
    }

    /// An in-memory stream yielding `chunks` in order with status 200.
    ///
    /// Handy for exercising consumers without a server.
    pub fn from_chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let chunks: Vec<Result<Bytes>> = chunks.into_iter().map(|c| Ok(c.into())).collect();
        Self {
            inner: Some(stream::iter(chunks).boxed()),
            cancelled: None,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            encoding: ResponseEncoding::default(),
        }
    }

    /// Replace the decoding hint.
    pub fn with_encoding(mut self, encoding: ResponseEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Replace the response headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// HTTP status of the response (always a success status).
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The `Content-Type` header, if present and readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// The decoding hint for text consumers.
    pub fn encoding(&self) -> ResponseEncoding {
        self.encoding
    }

    /// Next chunk of the body, or `None` at the end.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes>> {
        self.next().await
    }

    /// Read the rest of the body into one buffer.
    pub async fn collect_bytes(mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// Read the rest of the body as text according to [`encoding`](Self::encoding).
    pub async fn into_text(self) -> Result<String> {
        let encoding = self.encoding;
        let bytes = self.collect_bytes().await?;
        match encoding {
            ResponseEncoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| LookerError::Consumer(Box::new(e))),
            ResponseEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            ResponseEncoding::Binary => Err(LookerError::Consumer(
                "response is marked binary and cannot be read as text".into(),
            )),
        }
    }
}

impl Stream for ByteStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.inner.is_none() {
            return Poll::Ready(None);
        }
        if let Some(cancelled) = this.cancelled.as_mut() {
            if cancelled.as_mut().poll(cx).is_ready() {
                // Close the body so the connection is released.
                this.inner = None;
                this.cancelled = None;
                return Poll::Ready(Some(Err(LookerError::Cancelled)));
            }
        }
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };
        match inner.poll_next_unpin(cx) {
            Poll::Ready(None) => {
                this.inner = None;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// FromByteStream
// ---------------------------------------------------------------------------

/// A type that can be constructed from a response body.
///
/// Implement this to add a new way of consuming responses; endpoint methods
/// are generic over it.
pub trait FromByteStream: Sized + Send {
    /// Consume `stream` and build `Self`.
    fn from_byte_stream(stream: ByteStream) -> impl Future<Output = Result<Self>> + Send;
}

/// A JSON response deserialized into `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwrap the deserialized value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: DeserializeOwned + Send> FromByteStream for Json<T> {
    async fn from_byte_stream(stream: ByteStream) -> Result<Self> {
        let bytes = stream.collect_bytes().await?;
        Ok(Json(serde_json::from_slice(&bytes)?))
    }
}

impl FromByteStream for String {
    async fn from_byte_stream(stream: ByteStream) -> Result<Self> {
        stream.into_text().await
    }
}

impl FromByteStream for Bytes {
    async fn from_byte_stream(stream: ByteStream) -> Result<Self> {
        stream.collect_bytes().await
    }
}

impl FromByteStream for Vec<u8> {
    async fn from_byte_stream(stream: ByteStream) -> Result<Self> {
        Ok(stream.collect_bytes().await?.to_vec())
    }
}

impl FromByteStream for () {
    async fn from_byte_stream(mut stream: ByteStream) -> Result<Self> {
        while let Some(chunk) = stream.next().await {
            chunk?;
        }
        Ok(())
    }
}

impl FromByteStream for ByteStream {
    async fn from_byte_stream(stream: ByteStream) -> Result<Self> {
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct User {
        id: i64,
        email: String,
    }

    #[tokio::test]
    async fn json_across_chunk_boundaries() {
        let stream = ByteStream::from_chunks(vec![r#"{"id":4"#, r#"2,"email":"#, r#""a@b.c"}"#]);
        let Json(user) = Json::<User>::from_byte_stream(stream).await.unwrap();
        assert_eq!(
            user,
            User {
                id: 42,
                email: "a@b.c".into()
            }
        );
    }

    #[tokio::test]
    async fn invalid_json_is_a_consumer_error() {
        let stream = ByteStream::from_chunks(vec!["not json"]);
        let err = Json::<User>::from_byte_stream(stream).await.unwrap_err();
        assert!(err.is_consumer());
    }

    #[tokio::test]
    async fn text_honours_encoding() {
        let latin1 = ByteStream::from_chunks(vec![vec![0x63, 0x61, 0x66, 0xE9]]).with_encoding(ResponseEncoding::Latin1);
        assert_eq!(String::from_byte_stream(latin1).await.unwrap(), "café");

        let bad_utf8 = ByteStream::from_chunks(vec![vec![0xFF, 0xFE]]);
        assert!(String::from_byte_stream(bad_utf8).await.unwrap_err().is_consumer());

        let binary = ByteStream::from_chunks(vec!["abc"]).with_encoding(ResponseEncoding::Binary);
        assert!(matches!(
            String::from_byte_stream(binary).await,
            Err(LookerError::Consumer(_))
        ));
    }

    #[tokio::test]
    async fn chunks_are_delivered_in_order() {
        let mut stream = ByteStream::from_chunks(vec!["a", "b", "c"]);
        assert_eq!(stream.next_chunk().await.unwrap().unwrap(), "a");
        assert_eq!(stream.next_chunk().await.unwrap().unwrap(), "b");
        assert_eq!(stream.next_chunk().await.unwrap().unwrap(), "c");
        assert!(stream.next_chunk().await.is_none());
        assert!(stream.next_chunk().await.is_none());
    }

    #[tokio::test]
    async fn unit_drains_and_bytes_collect() {
        <()>::from_byte_stream(ByteStream::from_chunks(vec!["x"; 10])).await.unwrap();
        let bytes = Bytes::from_byte_stream(ByteStream::from_chunks(vec!["ab", "cd"])).await.unwrap();
        assert_eq!(bytes, "abcd");
    }

    #[tokio::test]
    async fn content_type_accessor() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "image/png".parse().unwrap());
        let stream = ByteStream::from_chunks(Vec::<Bytes>::new()).with_headers(headers);
        assert_eq!(stream.content_type(), Some("image/png"));
        assert_eq!(stream.status(), StatusCode::OK);
    }
}
