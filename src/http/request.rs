//! Request-line parsing.
//!
//! Only the first line of a request is ever inspected: the URI scan stops at
//! the first space, CR, or LF. The HTTP version token, header lines, and body
//! are ignored, and the URI is returned as raw
//! bytes without percent-decoding or query-string separation.

use std::fmt;

use thiserror::Error;

use super::Method;

/// Shortest input that can hold a method prefix: `"GET "` plus one byte.
const MIN_REQUEST_LEN: usize = 5;

/// Errors that can occur while parsing a request line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("request of {len} bytes is too short to hold a request line")]
    TooShort { len: usize },

    #[error("request method is not GET or POST")]
    UnsupportedMethod,

    #[error("request line ends before a space follows the URI")]
    Unterminated,
}

/// The method and URI of a request, borrowed from the receive buffer.
///
/// # Examples
///
/// ```
/// use nanohttp::http::{Method, RequestLine};
///
/// let line = RequestLine::parse(b"GET /hello HTTP/1.1\r\nHost: device\r\n\r\n").unwrap();
/// assert_eq!(line.method(), Method::Get);
/// assert_eq!(line.uri(), b"/hello");
///
/// assert!(RequestLine::parse(b"DELETE /hello HTTP/1.1\r\n").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RequestLine<'a> {
    method: Method,
    uri: &'a [u8],
}

impl<'a> RequestLine<'a> {
    /// Extracts the method and URI from the start of `buf`.
    ///
    /// The method must be exactly `GET ` or `POST ` (case-sensitive, single
    /// trailing space). The URI runs from there up to the next space byte,
    /// which must come before the end of the first line.
    ///
    /// # Errors
    ///
    /// - [`ParseError::TooShort`] — fewer than 5 bytes.
    /// - [`ParseError::UnsupportedMethod`] — any other verb.
    /// - [`ParseError::Unterminated`] — the line or buffer ends before a
    ///   space follows the URI.
    pub fn parse(buf: &'a [u8]) -> Result<Self, ParseError> {
        if buf.len() < MIN_REQUEST_LEN {
            return Err(ParseError::TooShort { len: buf.len() });
        }

        let (method, rest) = Method::ALL
            .into_iter()
            .find_map(|method| {
                buf.strip_prefix(method.as_str().as_bytes())
                    .and_then(|rest| rest.strip_prefix(b" "))
                    .map(|rest| (method, rest))
            })
            .ok_or(ParseError::UnsupportedMethod)?;

        let end = rest
            .iter()
            .position(|&b| matches!(b, b' ' | b'\r' | b'\n'))
            .filter(|&end| rest[end] == b' ')
            .ok_or(ParseError::Unterminated)?;

        Ok(Self {
            method,
            uri: &rest[..end],
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the raw request target, e.g. `b"/hello?x=1"`.
    pub fn uri(&self) -> &'a [u8] {
        self.uri
    }

    /// Returns the URI as text if it is valid UTF-8.
    pub fn uri_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.uri).ok()
    }
}

impl fmt::Debug for RequestLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLine")
            .field("method", &self.method)
            .field("uri", &String::from_utf8_lossy(self.uri))
            .finish()
    }
}
