//! Compile-time limits and the listening address.
//!
//! Every capacity in this crate is fixed at compile time so that memory use is
//! bounded up front. None of these values can be changed at runtime.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Port the server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 80;

/// Maximum number of routes a [`RouteTable`](crate::router::RouteTable) holds.
pub const MAX_ROUTES: usize = 10;

/// Maximum number of headers a [`Response`](crate::http::Response) carries.
pub const MAX_HEADERS: usize = 10;

/// Upper bound on the serialized size of a response, status line through body.
pub const RESPONSE_BUFFER_SIZE: usize = 1024;

/// Size of the single read used to receive a request (one Ethernet TCP segment).
pub const RECEIVE_BUFFER_SIZE: usize = 1460;

/// Pause before retrying after a failed `accept`.
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Where the server listens.
///
/// # Examples
///
/// ```
/// use nanohttp::config::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.port, 80);
/// assert_eq!(config.socket_addr().to_string(), "0.0.0.0:80");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<IpAddr>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)
    }
}
