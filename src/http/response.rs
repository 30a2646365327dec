//! HTTP/1.1 response builder.
//!
//! A [`Response`] accumulates a status, a bounded set of headers, and a body,
//! and serializes them into a buffer of at most
//! [`RESPONSE_BUFFER_SIZE`](crate::config::RESPONSE_BUFFER_SIZE) bytes.
//! A response that would not fit is never truncated: [`Response::build`]
//! fails and nothing is written.

use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

use super::{HeaderError, Headers, StatusCode};
use crate::config::RESPONSE_BUFFER_SIZE;

const CONTENT_TYPE: &str = "Content-Type";
const CONTENT_LENGTH: &str = "Content-Length";

/// Errors produced while serializing or sending a response.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("response of {len} bytes exceeds the {capacity}-byte response buffer")]
    Overflow { len: usize, capacity: usize },

    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// An HTTP/1.1 response under construction.
///
/// New responses carry `Content-Type: text/plain`, which handlers may
/// overwrite. [`set_body`](Self::set_body) keeps `Content-Length` in sync.
///
/// # Examples
///
/// ```
/// use nanohttp::http::{Response, StatusCode};
///
/// let mut response = Response::new(StatusCode::Ok);
/// response.set_body("Hello, World!").unwrap();
///
/// let bytes = response.build().unwrap();
/// let text = std::str::from_utf8(&bytes).unwrap();
/// assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
/// assert!(text.contains("Content-Type: text/plain\r\n"));
/// assert!(text.contains("Content-Length: 13\r\n"));
/// assert!(text.ends_with("\r\n\r\nHello, World!"));
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    /// Creates a response with the given status, a `text/plain` content type,
    /// and an empty body.
    pub fn new(status: StatusCode) -> Self {
        let mut headers = Headers::new();
        headers
            .set(CONTENT_TYPE, "text/plain")
            .expect("a fresh header list has room for Content-Type");
        Self {
            status,
            headers,
            body: Vec::new(),
        }
    }

    pub fn set_status(&mut self, status: impl Into<StatusCode>) {
        self.status = status.into();
    }

    /// Sets a header, overwriting any existing value for the same key.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::CapacityExceeded`] when `key` is new and the
    /// header list is full. Existing headers are left intact.
    pub fn set_header(
        &mut self,
        key: &'static str,
        value: impl Into<String>,
    ) -> Result<(), HeaderError> {
        self.headers.set(key, value)
    }

    /// Replaces the body and writes a matching `Content-Length` header.
    ///
    /// The body is stored even if the header cannot be added.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::CapacityExceeded`] if there is no room for
    /// `Content-Length`.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) -> Result<(), HeaderError> {
        self.body = body.into();
        self.headers.set(CONTENT_LENGTH, self.body.len().to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Number of bytes [`build`](Self::build) would produce, ignoring the buffer limit.
    pub fn encoded_len(&self) -> usize {
        self.status_line().len() + self.headers.encoded_len() + 2 + self.body.len()
    }

    /// Serializes the response into HTTP/1.1 wire format.
    ///
    /// Writes the status line, every header in insertion order, a blank line,
    /// and the body.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Overflow`] if the result would exceed
    /// [`RESPONSE_BUFFER_SIZE`]. No partial output is produced.
    pub fn build(&self) -> Result<Bytes, ResponseError> {
        let len = self.encoded_len();
        if len > RESPONSE_BUFFER_SIZE {
            warn!(
                len,
                capacity = RESPONSE_BUFFER_SIZE,
                status = self.status.as_u16(),
                "response does not fit in buffer"
            );
            return Err(ResponseError::Overflow {
                len,
                capacity: RESPONSE_BUFFER_SIZE,
            });
        }

        let mut buf = BytesMut::with_capacity(len);

        buf.put(self.status_line().as_bytes());

        for (key, value) in self.headers.iter() {
            buf.put(key.as_bytes());
            buf.put(&b": "[..]);
            buf.put(value.as_bytes());
            buf.put(&b"\r\n"[..]);
        }

        // Header/body separator
        buf.put(&b"\r\n"[..]);

        buf.put(self.body.as_slice());

        debug_assert_eq!(buf.len(), len);
        Ok(buf.freeze())
    }

    /// Builds the response and writes it to `conn`.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Overflow`] before anything is written if the
    /// response is too large, or [`ResponseError::Io`] if the write fails.
    pub async fn send<W>(&self, conn: &mut W) -> Result<(), ResponseError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let bytes = self.build()?;
        conn.write_all(&bytes).await?;
        conn.flush().await?;
        Ok(())
    }

    fn status_line(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\n",
            self.status.as_u16(),
            self.status.canonical_reason()
        )
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(bytes: Bytes) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn new_response_starts_with_plain_content_type_only() {
        let r = Response::new(StatusCode::Ok);
        assert_eq!(r.headers().len(), 1);
        assert_eq!(r.headers().get("Content-Type"), Some("text/plain"));
        assert!(r.body().is_empty());
    }

    #[test]
    fn simple_ok_response() {
        let mut r = Response::new(StatusCode::Ok);
        r.set_body("Hello, World!").unwrap();
        let s = to_string(r.build().unwrap());
        assert_eq!(
            s,
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 13\r\n\r\nHello, World!"
        );
    }

    #[test]
    fn content_length_tracks_latest_body() {
        let mut r = Response::default();
        r.set_body("Hello, World!").unwrap();
        assert_eq!(r.headers().get("Content-Length"), Some("13"));
        r.set_body("").unwrap();
        assert_eq!(r.headers().get("Content-Length"), Some("0"));
        assert_eq!(r.headers().len(), 2);
    }

    #[test]
    fn header_overwrite_preserves_order() {
        let mut r = Response::new(StatusCode::Ok);
        r.set_header("X-A", "1").unwrap();
        r.set_header("Content-Type", "application/json").unwrap();
        let s = to_string(r.build().unwrap());
        assert!(s.starts_with("HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nX-A: 1\r\n"));
    }

    #[test]
    fn set_status_changes_status_line() {
        let mut r = Response::default();
        r.set_status(StatusCode::InternalServerError);
        let s = to_string(r.build().unwrap());
        assert!(s.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[test]
    fn unknown_status_has_empty_reason() {
        let mut r = Response::default();
        r.set_status(418u16);
        let s = to_string(r.build().unwrap());
        assert!(s.starts_with("HTTP/1.1 418 \r\n"));
    }

    #[test]
    fn not_found() {
        let mut r = Response::new(StatusCode::NotFound);
        r.set_body("404 Not Found").unwrap();
        let s = to_string(r.build().unwrap());
        assert!(s.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[test]
    fn full_header_list_rejects_content_length_but_keeps_body() {
        let mut r = Response::new(StatusCode::Ok);
        for key in ["A", "B", "C", "D", "E", "F", "G", "H", "I"] {
            r.set_header(key, "x").unwrap();
        }
        assert_eq!(r.headers().len(), 10);
        let err = r.set_body("data").unwrap_err();
        assert!(matches!(err, HeaderError::CapacityExceeded { key: "Content-Length", .. }));
        assert_eq!(r.body(), b"data");
        assert!(r.headers().get("A").is_some());
    }

    #[test]
    fn overflowing_response_fails_without_output() {
        let mut r = Response::new(StatusCode::Ok);
        r.set_body(vec![b'x'; RESPONSE_BUFFER_SIZE]).unwrap();
        match r.build() {
            Err(ResponseError::Overflow { len, capacity }) => {
                assert_eq!(capacity, RESPONSE_BUFFER_SIZE);
                assert_eq!(len, r.encoded_len());
                assert!(len > capacity);
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }

    #[test]
    fn response_exactly_at_capacity_is_accepted() {
        let mut r = Response::new(StatusCode::Ok);
        r.set_body("").unwrap();
        let overhead = r.encoded_len();
        // Content-Length grows from "0" to three digits.
        let body_len = RESPONSE_BUFFER_SIZE - overhead - 2;
        r.set_body(vec![b'y'; body_len]).unwrap();
        assert_eq!(r.encoded_len(), RESPONSE_BUFFER_SIZE);
        assert_eq!(r.build().unwrap().len(), RESPONSE_BUFFER_SIZE);

        r.set_header("X-One-More", "z").unwrap();
        assert!(matches!(r.build(), Err(ResponseError::Overflow { .. })));
    }

    #[tokio::test]
    async fn send_writes_built_bytes() {
        let mut r = Response::new(StatusCode::Ok);
        r.set_body("ok").unwrap();
        let mut out: Vec<u8> = Vec::new();
        r.send(&mut out).await.unwrap();
        assert_eq!(out, r.build().unwrap());
    }

    #[tokio::test]
    async fn send_writes_nothing_on_overflow() {
        let mut r = Response::new(StatusCode::Ok);
        r.set_body(vec![0u8; 2 * RESPONSE_BUFFER_SIZE]).unwrap();
        let mut out: Vec<u8> = Vec::new();
        let err = r.send(&mut out).await.unwrap_err();
        assert!(matches!(err, ResponseError::Overflow { .. }));
        assert!(out.is_empty());
    }
}
