//! Liveness endpoint for the hosting platform.
//!
//! Every method on every path answers `200 OK` with a fixed plain-text body.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::Result;

pub const LIVENESS_BODY: &str = "AlgeriaMinha bot running";

async fn alive() -> &'static str {
    LIVENESS_BODY
}

pub fn router() -> Router {
    Router::new().fallback(alive)
}

/// Serve the liveness router on an already-bound listener.
pub async fn serve(listener: TcpListener) -> Result<()> {
    axum::serve(listener, router()).await?;
    Ok(())
}

/// Bind `0.0.0.0:port` and serve forever.
pub async fn run(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("[web] running on port {port}");
    serve(listener).await
}
