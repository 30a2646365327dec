//! Single-connection-at-a-time HTTP server on Tokio.
//!
//! A [`Server`] owns a [`RouteTable`] while it is being set up. Calling
//! [`Server::start`] moves the connection loop onto a spawned task, and from
//! then on the table is shared read-only with that task.
//!
//! The loop handles connections strictly one after another:
//!
//! 1. Accept a connection. Accept errors are logged and retried after
//!    [`ACCEPT_RETRY_DELAY`].
//! 2. Read from it exactly once and treat the bytes as the whole request.
//!    A request split across several segments is not reassembled.
//! 3. Parse the request line. Failure sends a fixed `404 Not Found`.
//! 4. Look the route up. No match sends the same `404`. A match runs the
//!    handler, which sends its own response. If the handler fails or panics
//!    before writing anything, a fixed `500 Internal Server Error` is sent
//!    instead. Once a handler has written, nothing more is added.
//! 5. Close the connection. There is no keep-alive.
//!
//! No read or write timeout is applied, so a slow peer or a slow handler
//! stalls every client queued behind it.

use std::any::Any;
use std::io;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::BytesMut;
use futures_util::FutureExt;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{ACCEPT_RETRY_DELAY, RECEIVE_BUFFER_SIZE, ServerConfig};
use crate::context::Context;
use crate::http::{Method, RequestLine, ResponseError};
use crate::router::{IntoHandler, RouteError, RouteTable};

pub mod transport;

pub use transport::{Acceptor, Connection};

/// Sent when the request line cannot be parsed or no route matches.
const NOT_FOUND: &[u8] = b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n";

/// Sent when a handler fails or panics before writing anything.
const INTERNAL_SERVER_ERROR: &[u8] =
    b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n";

/// Errors produced by the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// Binds a TCP listener for `config`.
///
/// The network interface must already be up; this crate does not manage it.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be bound
/// (e.g. port already in use, insufficient permissions).
pub async fn listen(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(address = %listener.local_addr()?, "listening");
    Ok(listener)
}

/// Lifecycle of a [`Server`]. States only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Routes may still be added.
    Created,
    /// The loop task has been spawned but has not begun accepting.
    Started,
    /// The loop task is accepting connections.
    Running,
    /// The loop task has ended. It is never restarted.
    Stopped,
}

/// The HTTP server.
///
/// # Examples
///
/// ```rust,no_run
/// use nanohttp::config::ServerConfig;
/// use nanohttp::context::Context;
/// use nanohttp::http::{Method, Response, StatusCode};
/// use nanohttp::router::HandlerFuture;
/// use nanohttp::server::{self, Server};
///
/// fn hello(mut ctx: Context<'_>) -> HandlerFuture<'_> {
///     Box::pin(async move {
///         let mut response = Response::new(StatusCode::Ok);
///         response.set_body("Hello, World!")?;
///         ctx.respond(&response).await
///     })
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut server = Server::new();
///     server.add_route("/hello", Method::Get, hello)?;
///
///     let listener = server::listen(&ServerConfig::default()).await?;
///     assert!(server.start(listener));
///
///     tokio::signal::ctrl_c().await?;
///     Ok(())
/// }
/// ```
pub struct Server {
    routes: Arc<RouteTable>,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl Server {
    /// Creates a server with an empty route table of default capacity.
    pub fn new() -> Self {
        Self::with_routes(RouteTable::new())
    }

    /// Creates a server around an existing route table.
    pub fn with_routes(routes: RouteTable) -> Self {
        Self {
            routes: Arc::new(routes),
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// Registers a route. Only possible before [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// - [`RouteError::CapacityExceeded`] — the route table is full.
    /// - [`RouteError::Frozen`] — the server has already started.
    pub fn add_route(
        &mut self,
        uri: impl Into<String>,
        method: Method,
        handler: impl IntoHandler,
    ) -> Result<(), RouteError> {
        let uri = uri.into();
        if self.task.is_some() {
            warn!(uri = %uri, %method, "server already started, route not added");
            return Err(RouteError::Frozen);
        }
        match Arc::get_mut(&mut self.routes) {
            Some(routes) => routes.add_route(uri, method, handler),
            None => Err(RouteError::Frozen),
        }
    }

    /// Spawns the connection loop on the current Tokio runtime.
    ///
    /// Returns `false` without doing anything if the server was already
    /// started, or if there is no runtime to spawn onto.
    pub fn start<A: Acceptor>(&mut self, acceptor: A) -> bool {
        if self.task.is_some() {
            warn!("server already started");
            return false;
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "no Tokio runtime to run the server on");
                return false;
            }
        };

        let routes = Arc::clone(&self.routes);
        let running = Arc::clone(&self.running);
        self.task = Some(handle.spawn(run(acceptor, routes, running)));
        true
    }

    pub fn state(&self) -> State {
        match &self.task {
            None => State::Created,
            Some(task) if task.is_finished() => State::Stopped,
            Some(_) if self.running.load(Ordering::Acquire) => State::Running,
            Some(_) => State::Started,
        }
    }

    pub fn is_started(&self) -> bool {
        self.task.is_some()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Accepts and serves connections one at a time, forever.
async fn run<A: Acceptor>(mut acceptor: A, routes: Arc<RouteTable>, running: Arc<AtomicBool>) {
    running.store(true, Ordering::Release);
    info!(routes = routes.len(), "server running");

    loop {
        let (mut conn, peer) = match acceptor.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "failed to accept connection, retrying");
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };

        debug!(peer = ?peer, "connection accepted");

        if let Err(e) = handle_connection(&mut conn, &routes).await {
            warn!(peer = ?peer, error = %e, "connection closed with error");
        }

        if let Err(e) = conn.shutdown().await {
            debug!(peer = ?peer, error = %e, "shutdown failed");
        }
    }
}

/// Serves one request on `conn`. The caller closes the connection.
async fn handle_connection<C: Connection>(conn: &mut C, routes: &RouteTable) -> io::Result<()> {
    let mut buf = BytesMut::with_capacity(RECEIVE_BUFFER_SIZE);

    if conn.read_buf(&mut buf).await? == 0 {
        debug!("connection closed before a request arrived");
        return Ok(());
    }

    let line = match RequestLine::parse(&buf) {
        Ok(line) => line,
        Err(e) => {
            debug!(error = %e, "unparseable request line, sending 404");
            return send_fixed(conn, NOT_FOUND).await;
        }
    };

    let Some(route) = routes.find_route(line.uri(), line.method()) else {
        debug!(method = %line.method(), uri = %String::from_utf8_lossy(line.uri()), "no route, sending 404");
        return send_fixed(conn, NOT_FOUND).await;
    };

    debug!(method = %line.method(), uri = route.uri(), "dispatching request");

    let mut responded = false;
    let ctx = Context::new(conn, &buf, line, &mut responded);
    let handler = route.handler();
    let outcome = AssertUnwindSafe(async move { handler.call(ctx).await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(ResponseError::Io(e))) => Err(e),
        Ok(Err(e)) if responded => {
            warn!(uri = route.uri(), error = %e, "handler failed after responding");
            Ok(())
        }
        Ok(Err(e)) => {
            warn!(uri = route.uri(), error = %e, "handler could not respond, sending 500");
            send_fixed(conn, INTERNAL_SERVER_ERROR).await
        }
        Err(panic) => {
            error!(uri = route.uri(), panic = panic_message(&*panic), responded, "handler panicked");
            if responded {
                Ok(())
            } else {
                send_fixed(conn, INTERNAL_SERVER_ERROR).await
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

async fn send_fixed<C: Connection>(conn: &mut C, response: &[u8]) -> io::Result<()> {
    conn.write_all(response).await?;
    conn.flush().await
}
