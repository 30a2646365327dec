//! The HTTP/1.1 subset spoken by the server.
//!
//! This module provides the protocol primitives:
//! [`Method`], [`StatusCode`], [`Headers`], [`RequestLine`], and [`Response`].

use std::fmt;

pub mod headers;
pub mod request;
pub mod response;

pub use headers::{HeaderError, Headers};
pub use request::{ParseError, RequestLine};
pub use response::{Response, ResponseError};

/// An HTTP response status code.
///
/// Only four codes have a known reason phrase. Any other numeric code can be
/// carried in [`StatusCode::Other`] and serializes with an empty reason.
///
/// # Examples
///
/// ```
/// use nanohttp::http::StatusCode;
///
/// let status = StatusCode::Ok;
/// assert_eq!(status.as_u16(), 200);
/// assert_eq!(status.canonical_reason(), "OK");
///
/// let teapot = StatusCode::from_u16(418);
/// assert_eq!(teapot, StatusCode::Other(418));
/// assert_eq!(teapot.canonical_reason(), "");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    BadRequest,
    NotFound,
    InternalServerError,
    /// A code outside the known set. Has no reason phrase.
    Other(u16),
}

impl StatusCode {
    /// Maps a numeric code to a `StatusCode`, falling back to [`StatusCode::Other`].
    pub fn from_u16(code: u16) -> Self {
        match code {
            200 => Self::Ok,
            400 => Self::BadRequest,
            404 => Self::NotFound,
            500 => Self::InternalServerError,
            other => Self::Other(other),
        }
    }

    /// Returns the numeric status code as a `u16`.
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::InternalServerError => 500,
            Self::Other(code) => code,
        }
    }

    /// Returns the reason phrase, or `""` for [`StatusCode::Other`].
    pub fn canonical_reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::InternalServerError => "Internal Server Error",
            Self::Other(_) => "",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.canonical_reason())
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> u16 {
        code.as_u16()
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self::from_u16(code)
    }
}

/// A supported HTTP request method.
///
/// Anything other than `GET` and `POST` is rejected by the request parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Every method the parser recognizes, in the order prefixes are tried.
    pub const ALL: [Method; 2] = [Method::Get, Method::Post];

    /// Returns the method as a string slice.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_round_trip_through_u16() {
        for status in [
            StatusCode::Ok,
            StatusCode::BadRequest,
            StatusCode::NotFound,
            StatusCode::InternalServerError,
        ] {
            assert_eq!(StatusCode::from_u16(status.as_u16()), status);
            assert!(!status.canonical_reason().is_empty());
        }
    }

    #[test]
    fn unknown_code_has_empty_reason() {
        let status = StatusCode::from(503);
        assert_eq!(status, StatusCode::Other(503));
        assert_eq!(status.to_string(), "503 ");
    }

    #[test]
    fn status_display() {
        assert_eq!(StatusCode::NotFound.to_string(), "404 Not Found");
    }

    #[test]
    fn method_names() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
    }
}
