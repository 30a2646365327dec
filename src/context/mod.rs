//! Per-request context handed to route handlers.
//!
//! A [`Context`] lives for exactly one request/response exchange. It lends
//! the handler the open connection, the raw bytes of the single receive,
//! and the parsed request line. The connection loop closes the connection
//! once the handler returns, so a handler must send its response first.

use std::fmt;

use tokio::io::AsyncWriteExt;

use crate::http::{Method, RequestLine, Response, ResponseError};
use crate::server::transport::Connection;

/// The connection and request a handler is responding to.
///
/// # Examples
///
/// ```rust,no_run
/// use nanohttp::context::Context;
/// use nanohttp::http::{Response, StatusCode};
/// use nanohttp::router::HandlerFuture;
///
/// fn echo_uri(mut ctx: Context<'_>) -> HandlerFuture<'_> {
///     Box::pin(async move {
///         let mut response = Response::new(StatusCode::Ok);
///         response.set_body(ctx.uri())?;
///         ctx.respond(&response).await
///     })
/// }
/// ```
pub struct Context<'a> {
    conn: &'a mut dyn Connection,
    raw: &'a [u8],
    line: RequestLine<'a>,
    // Set once anything may have reached the connection; read back by the loop.
    responded: &'a mut bool,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        conn: &'a mut dyn Connection,
        raw: &'a [u8],
        line: RequestLine<'a>,
        responded: &'a mut bool,
    ) -> Self {
        Self {
            conn,
            raw,
            line,
            responded,
        }
    }

    pub fn method(&self) -> Method {
        self.line.method()
    }

    /// The raw request target, exactly as received.
    pub fn uri(&self) -> &'a [u8] {
        self.line.uri()
    }

    /// Everything the single receive returned: request line, headers, and
    /// whatever part of the body arrived with them.
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Body bytes following the blank line, if the header terminator arrived.
    pub fn body(&self) -> Option<&'a [u8]> {
        self.raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map(|pos| &self.raw[pos + 4..])
    }

    /// The underlying connection, for handlers that write raw bytes.
    ///
    /// The exchange counts as answered from this point on.
    pub fn connection(&mut self) -> &mut dyn Connection {
        *self.responded = true;
        &mut *self.conn
    }

    /// Returns `true` once a response has been (or may have been) written.
    pub fn has_responded(&self) -> bool {
        *self.responded
    }

    /// Builds `response` and writes it to the connection.
    ///
    /// # Errors
    ///
    /// See [`Response::send`]. On [`ResponseError::Overflow`] nothing has been
    /// written, so the handler may still send a smaller response.
    pub async fn respond(&mut self, response: &Response) -> Result<(), ResponseError> {
        let bytes = response.build()?;
        *self.responded = true;
        self.conn.write_all(&bytes).await?;
        self.conn.flush().await?;
        Ok(())
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("line", &self.line)
            .field("raw_len", &self.raw.len())
            .field("responded", &*self.responded)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;
    use tokio::io::{AsyncReadExt, duplex};

    #[tokio::test]
    async fn exposes_request_parts() {
        let raw = b"POST /submit HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi";
        let (mut server, _client) = duplex(1024);
        let line = RequestLine::parse(raw).unwrap();
        let mut responded = false;
        let ctx = Context::new(&mut server, raw, line, &mut responded);

        assert_eq!(ctx.method(), Method::Post);
        assert_eq!(ctx.uri(), b"/submit");
        assert_eq!(ctx.raw().len(), raw.len());
        assert_eq!(ctx.body(), Some(&b"hi"[..]));
    }

    #[tokio::test]
    async fn body_absent_without_header_terminator() {
        let raw = b"GET /partial HTTP/1.1\r\nHost: x";
        let (mut server, _client) = duplex(1024);
        let mut responded = false;
        let ctx = Context::new(&mut server, raw, RequestLine::parse(raw).unwrap(), &mut responded);
        assert_eq!(ctx.body(), None);
    }

    #[tokio::test]
    async fn respond_writes_to_connection() {
        let raw = b"GET / HTTP/1.1\r\n\r\n";
        let (mut server, mut client) = duplex(1024);
        let mut responded = false;
        {
            let mut ctx =
                Context::new(&mut server, raw, RequestLine::parse(raw).unwrap(), &mut responded);
            assert!(!ctx.has_responded());
            let mut response = Response::new(StatusCode::Ok);
            response.set_body("pong").unwrap();
            ctx.respond(&response).await.unwrap();
            assert!(ctx.has_responded());
        }
        assert!(responded);
        drop(server);

        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        assert!(out.starts_with(b"HTTP/1.1 200 OK\r\n"));
        assert!(out.ends_with(b"\r\n\r\npong"));
    }

    #[tokio::test]
    async fn overflow_leaves_exchange_unanswered() {
        let raw = b"GET / HTTP/1.1\r\n\r\n";
        let (mut server, _client) = duplex(1024);
        let mut responded = false;
        let mut ctx =
            Context::new(&mut server, raw, RequestLine::parse(raw).unwrap(), &mut responded);
        let mut response = Response::new(StatusCode::Ok);
        response.set_body(vec![b'x'; 4096]).unwrap();

        assert!(matches!(
            ctx.respond(&response).await,
            Err(ResponseError::Overflow { .. })
        ));
        assert!(!ctx.has_responded());
    }
}
