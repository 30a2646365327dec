//! The transport contract the connection loop runs on.
//!
//! The loop needs four primitives: accept, receive, send, and close.
//! [`Acceptor`] supplies the first. A [`Connection`] supplies the rest
//! through tokio's `AsyncRead` (receive), `AsyncWrite` (send), and
//! `AsyncWrite::poll_shutdown` followed by drop (close).

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};

/// A bidirectional byte stream scoped to one request/response exchange.
///
/// Implemented for every `AsyncRead + AsyncWrite + Unpin + Send` type, so
/// [`TcpStream`] and `tokio::io::DuplexStream` both qualify.
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Connection for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// A source of incoming connections.
///
/// Errors returned by [`accept`](Self::accept) are treated as transient:
/// the loop waits briefly and calls it again.
pub trait Acceptor: Send + 'static {
    type Conn: Connection + 'static;

    /// Waits for the next connection and, when known, the peer address.
    fn accept(&mut self) -> impl Future<Output = io::Result<(Self::Conn, Option<SocketAddr>)>> + Send;
}

impl Acceptor for TcpListener {
    type Conn = TcpStream;

    async fn accept(&mut self) -> io::Result<(TcpStream, Option<SocketAddr>)> {
        let (stream, peer) = TcpListener::accept(self).await?;
        Ok((stream, Some(peer)))
    }
}
