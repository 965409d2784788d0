//! HTTP surface: JSON API, HTML pages and static files.

pub mod api;
mod error;
pub mod pages;
mod templates;

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::context::Context;
use crate::db::SqlExecutor;

pub use error::ErrorBody;

/// Mount point of the JSON API.
pub const API_PREFIX: &str = "/api/videogames";

/// Build the application router over `ctx`.
pub fn router<E: SqlExecutor + 'static>(ctx: Context<E>) -> Router {
    let static_dir = ServeDir::new(&ctx.config.server.static_dir);

    Router::new()
        .merge(pages::routes::<E>())
        .nest(API_PREFIX, api::routes::<E>())
        // nest only matches the bare prefix
        .route(&format!("{}/", API_PREFIX), get(api::list::<E>))
        .nest_service("/static", static_dir)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Serve `ctx` on `addr` until Ctrl-C or SIGTERM.
///
/// In-flight requests are drained before this returns.
pub async fn serve<E: SqlExecutor + 'static>(
    ctx: Context<E>,
    addr: SocketAddr,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("Shutdown signal received, draining connections");
}
