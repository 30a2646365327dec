//! Serves `GET /hello` the way a device firmware would.
//!
//! ```text
//! RUST_LOG=debug cargo run --example hello_world
//! curl http://127.0.0.1:8080/hello
//! ```

use std::net::Ipv4Addr;

use nanohttp::config::ServerConfig;
use nanohttp::server::{self, Server};
use nanohttp::{Context, HandlerFuture, Method, Response, StatusCode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn hello(mut ctx: Context<'_>) -> HandlerFuture<'_> {
    Box::pin(async move {
        let mut response = Response::new(StatusCode::Ok);
        response.set_body("Hello, World!")?;
        response.set_header("Content-Type", "text/plain")?;
        ctx.respond(&response).await
    })
}

fn echo(mut ctx: Context<'_>) -> HandlerFuture<'_> {
    Box::pin(async move {
        let mut response = Response::new(StatusCode::Ok);
        response.set_body(ctx.body().unwrap_or_default())?;
        response.set_header("Content-Type", "application/octet-stream")?;
        ctx.respond(&response).await
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut server = Server::new();
    server.add_route("/hello", Method::Get, hello)?;
    server.add_route("/echo", Method::Post, echo)?;

    // Port 80 needs privileges on most hosts, so the demo uses 8080.
    let listener = server::listen(&ServerConfig::new(Ipv4Addr::LOCALHOST, 8080)).await?;

    if server.start(listener) {
        info!("HTTP server started");
    } else {
        error!("failed to start HTTP server");
    }

    tokio::signal::ctrl_c().await?;
    Ok(())
}
