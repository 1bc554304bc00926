//! HTTP server setup

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::routes::create_router;
use crate::state::AppState;

/// Builds the router and resolves the bind address from `config`.
pub fn create_server(config: &ServerConfig) -> ServerResult<(Router, SocketAddr)> {
    let state = AppState::from_config(config)?;
    let router = create_router(state, &config.normalized_prefix()).layer(TraceLayer::new_for_http());
    Ok((router, config.listen))
}

/// Runs the server until ctrl-c (or SIGTERM on unix).
pub async fn run_server(config: ServerConfig) -> ServerResult<()> {
    let (router, addr) = create_server(&config)?;

    let listener = TcpListener::bind(addr).await?;
    info!(
        "keyseal listening on {} (key routes under {}/geds)",
        listener.local_addr()?,
        config.normalized_prefix()
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("keyseal stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
