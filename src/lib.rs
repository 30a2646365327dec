//! # nanohttp
//!
//! A minimal HTTP/1.1 server for resource-constrained devices: a
//! fixed-capacity route table, a request-line parser, and a bounded response
//! serializer, driven by a loop that serves one connection at a time.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nanohttp::{Context, HandlerFuture, Method, Response, Server, StatusCode};
//! use nanohttp::config::ServerConfig;
//!
//! fn hello(mut ctx: Context<'_>) -> HandlerFuture<'_> {
//!     Box::pin(async move {
//!         let mut response = Response::new(StatusCode::Ok);
//!         response.set_body("Hello, World!")?;
//!         ctx.respond(&response).await
//!     })
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new();
//!     server.add_route("/hello", Method::Get, hello)?;
//!
//!     let listener = nanohttp::server::listen(&ServerConfig::default()).await?;
//!     server.start(listener);
//!
//!     tokio::signal::ctrl_c().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Limits
//!
//! - Only `GET` and `POST` are recognized; only the request line is parsed.
//! - One read per connection is taken as the complete request.
//! - Responses larger than [`config::RESPONSE_BUFFER_SIZE`] are refused, not truncated.
//! - No keep-alive, pipelining, chunked encoding, or TLS.
//! - Routes are registered before [`Server::start`] and never afterwards.

pub mod config;
pub mod context;
pub mod http;
pub mod router;
pub mod server;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use context::Context;
pub use http::{Headers, Method, RequestLine, Response, ResponseError, StatusCode};
pub use router::{HandlerFuture, RouteError, RouteTable};
pub use server::{Server, ServerError};
