//! Bounded response header list with case-sensitive keys.
//!
//! Unlike a general header map, each key appears at most once: setting an
//! existing key overwrites its value in place and keeps its position.

use std::fmt;

use thiserror::Error;
use tracing::warn;

use crate::config::MAX_HEADERS;

/// Errors produced when modifying a [`Headers`] list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("header limit of {capacity} reached, cannot add {key}")]
    CapacityExceeded { key: &'static str, capacity: usize },
}

/// An insertion-ordered, fixed-capacity list of unique headers.
///
/// # Examples
///
/// ```
/// use nanohttp::http::Headers;
///
/// let mut headers = Headers::new();
/// headers.set("Content-Type", "text/plain").unwrap();
/// headers.set("X-Device", "sensor-1").unwrap();
/// headers.set("Content-Type", "text/html").unwrap();
///
/// assert_eq!(headers.len(), 2);
/// assert_eq!(headers.get("Content-Type"), Some("text/html"));
/// assert_eq!(headers.get("content-type"), None); // keys are case-sensitive
/// ```
#[derive(Debug, Clone)]
pub struct Headers {
    inner: Vec<(&'static str, String)>,
    limit: usize,
}

impl Headers {
    /// Creates an empty list holding at most [`MAX_HEADERS`] entries.
    pub fn new() -> Self {
        Self::with_limit(MAX_HEADERS)
    }

    /// Creates an empty list holding at most `limit` entries.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Sets `key` to `value`.
    ///
    /// An existing entry with an identical key is overwritten in place.
    /// Otherwise the entry is appended, unless the list is full.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::CapacityExceeded`] if `key` is new and the list
    /// already holds its limit. The list is left untouched.
    pub fn set(&mut self, key: &'static str, value: impl Into<String>) -> Result<(), HeaderError> {
        if let Some((_, existing)) = self.inner.iter_mut().find(|(k, _)| *k == key) {
            *existing = value.into();
            return Ok(());
        }

        if self.inner.len() >= self.limit {
            warn!(key, capacity = self.limit, "header limit reached, dropping header");
            return Err(HeaderError::CapacityExceeded {
                key,
                capacity: self.limit,
            });
        }

        self.inner.push((key, value.into()));
        Ok(())
    }

    /// Returns the value for `key` (case-sensitive), or `None`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if an entry with exactly this key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.iter().any(|(k, _)| *k == key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Maximum number of entries.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns an iterator over all `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.inner.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Number of bytes the `key: value\r\n` lines occupy on the wire.
    pub(crate) fn encoded_len(&self) -> usize {
        self.inner
            .iter()
            .map(|(k, v)| k.len() + 2 + v.len() + 2)
            .sum()
    }
}

impl Default for Headers {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.inner {
            write!(f, "{key}: {value}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_keeps_count_and_position() {
        let mut h = Headers::new();
        h.set("K", "v1").unwrap();
        h.set("Other", "x").unwrap();
        h.set("K", "v2").unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h.get("K"), Some("v2"));
        let keys: Vec<_> = h.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["K", "Other"]);
    }

    #[test]
    fn case_sensitive_keys() {
        let mut h = Headers::new();
        h.set("Content-Type", "text/plain").unwrap();
        h.set("content-type", "text/html").unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h.get("Content-Type"), Some("text/plain"));
        assert!(!h.contains("CONTENT-TYPE"));
    }

    #[test]
    fn eleventh_distinct_key_rejected() {
        const KEYS: [&str; 11] = ["H0", "H1", "H2", "H3", "H4", "H5", "H6", "H7", "H8", "H9", "H10"];
        let mut h = Headers::new();
        for (i, key) in KEYS[..10].iter().copied().enumerate() {
            h.set(key, i.to_string()).unwrap();
        }

        let err = h.set(KEYS[10], "overflow").unwrap_err();
        assert_eq!(
            err,
            HeaderError::CapacityExceeded {
                key: "H10",
                capacity: 10
            }
        );
        assert_eq!(h.len(), 10);
        for (i, key) in KEYS[..10].iter().copied().enumerate() {
            assert_eq!(h.get(key), Some(i.to_string().as_str()));
        }
    }

    #[test]
    fn overwrite_allowed_when_full() {
        let mut h = Headers::with_limit(1);
        h.set("Only", "a").unwrap();
        assert!(h.set("Only", "b").is_ok());
        assert_eq!(h.get("Only"), Some("b"));
    }

    #[test]
    fn display_and_encoded_len_agree() {
        let mut h = Headers::new();
        h.set("A", "1").unwrap();
        h.set("Bb", "22").unwrap();
        let wire = h.to_string();
        assert_eq!(wire, "A: 1\r\nBb: 22\r\n");
        assert_eq!(wire.len(), h.encoded_len());
    }
}
