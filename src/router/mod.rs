//! Fixed-capacity route table — map a URI and method to a handler.
//!
//! Routes are exact-match only: the request target must equal the
//! registered URI byte for byte. Each route's URI hash is computed once at
//! registration, so a lookup rejects most entries with a single integer
//! comparison before falling back to a full byte comparison.
//!
//! The table performs no uniqueness check. Duplicate registrations are all
//! stored, and lookup returns the first one in registration order.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::config::MAX_ROUTES;
use crate::context::Context;
use crate::http::{Method, ResponseError};

/// Boxed future returned by a handler, borrowing the request's [`Context`].
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ResponseError>> + Send + 'a>>;

/// A type-erased, cheaply cloneable handler.
pub type Handler = Arc<dyn IntoHandler>;

/// Conversion trait for handler functions.
///
/// Any `fn(Context<'_>) -> HandlerFuture<'_>` implements this trait via the
/// blanket impl below. The handler owns the reply: it must build and send a
/// [`Response`](crate::http::Response) through the context before its future
/// completes.
pub trait IntoHandler: Send + Sync + 'static {
    /// Call the handler with the given context.
    fn call<'a>(&self, ctx: Context<'a>) -> HandlerFuture<'a>;
}

impl<T> IntoHandler for T
where
    T: for<'a> Fn(Context<'a>) -> HandlerFuture<'a> + Send + Sync + 'static,
{
    fn call<'a>(&self, ctx: Context<'a>) -> HandlerFuture<'a> {
        (self)(ctx)
    }
}

/// Errors produced when registering a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route limit of {capacity} reached, cannot add {uri}")]
    CapacityExceeded { capacity: usize, uri: String },

    #[error("routes cannot be added once the server has started")]
    Frozen,
}

/// 32-bit FNV-1a over raw bytes.
///
/// Used only to reject non-matching routes quickly; equal hashes are always
/// confirmed with a full comparison.
pub const fn fnv1a(data: &[u8]) -> u32 {
    const OFFSET_BASIS: u32 = 2_166_136_261;
    const PRIME: u32 = 16_777_619;

    let mut hash = OFFSET_BASIS;
    let mut i = 0;
    while i < data.len() {
        hash ^= data[i] as u32;
        hash = hash.wrapping_mul(PRIME);
        i += 1;
    }
    hash
}

/// A registered `(uri, method) → handler` binding. Immutable once stored.
#[derive(Clone)]
pub struct Route {
    uri: String,
    method: Method,
    handler: Handler,
}

impl Route {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("uri", &self.uri)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// A bounded list of routes with precomputed URI hashes.
///
/// `hashes[i]` is always `fnv1a(routes[i].uri)`, and the table never holds
/// more than its capacity.
///
/// # Examples
///
/// ```rust,no_run
/// use nanohttp::context::Context;
/// use nanohttp::http::{Method, Response, StatusCode};
/// use nanohttp::router::{HandlerFuture, RouteTable};
///
/// fn ping(mut ctx: Context<'_>) -> HandlerFuture<'_> {
///     Box::pin(async move { ctx.respond(&Response::new(StatusCode::Ok)).await })
/// }
///
/// let mut table = RouteTable::new();
/// table.add_route("/ping", Method::Get, ping).unwrap();
///
/// assert!(table.find_route(b"/ping", Method::Get).is_some());
/// assert!(table.find_route(b"/ping", Method::Post).is_none());
/// ```
pub struct RouteTable {
    routes: Vec<Route>,
    hashes: Vec<u32>,
    capacity: usize,
}

impl RouteTable {
    /// Creates an empty table holding at most [`MAX_ROUTES`] routes.
    pub fn new() -> Self {
        Self::with_capacity(MAX_ROUTES)
    }

    /// Creates an empty table holding at most `capacity` routes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            routes: Vec::with_capacity(capacity),
            hashes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a route.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::CapacityExceeded`] if the table is full. The
    /// route is dropped and the table is unchanged.
    pub fn add_route(
        &mut self,
        uri: impl Into<String>,
        method: Method,
        handler: impl IntoHandler,
    ) -> Result<(), RouteError> {
        let uri = uri.into();

        if self.routes.len() >= self.capacity {
            warn!(capacity = self.capacity, uri = %uri, %method, "route limit reached, dropping route");
            return Err(RouteError::CapacityExceeded {
                capacity: self.capacity,
                uri,
            });
        }

        self.hashes.push(fnv1a(uri.as_bytes()));
        self.routes.push(Route {
            uri,
            method,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// Returns the first route registered for exactly this `uri` and `method`.
    pub fn find_route(&self, uri: &[u8], method: Method) -> Option<&Route> {
        if self.routes.is_empty() {
            return None;
        }

        let hash = fnv1a(uri);
        self.routes
            .iter()
            .zip(&self.hashes)
            .find(|&(route, &route_hash)| {
                route_hash == hash && route.method == method && route.uri.as_bytes() == uri
            })
            .map(|(route, _)| route)
    }

    /// Return the number of routes registered.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates over routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes)
            .field("capacity", &self.capacity)
            .finish()
    }
}
