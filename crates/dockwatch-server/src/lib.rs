//! HTTP and WebSocket log-streaming server for dockwatch.
//!
//! Serves the login/listing/health endpoints and upgrades `/ws` into a
//! per-connection session that streams container logs after an
//! authentication gate.

mod auth;
mod http;
mod session;
mod ws;

pub use auth::{Auth, Claims};
pub use http::{AppState, build_router};
pub use session::{Engine, Session};

use std::net::SocketAddr;
use std::sync::Arc;

use dockwatch_core::{Config, Result};
use dockwatch_docker::DockerEngine;

/// Connect to the engine and serve until the process is stopped.
///
/// When the Docker daemon is unreachable the server still starts, with
/// container features answering "unavailable" per request.
pub async fn run(config: Config) -> Result<()> {
    let engine = match DockerEngine::connect(config.docker_socket.as_deref()) {
        Ok(engine) => match engine.ping().await {
            Ok(()) => {
                tracing::info!("docker connection established");
                Some(Arc::new(engine))
            }
            Err(e) => {
                tracing::error!("docker connection failed: {e}");
                None
            }
        },
        Err(e) => {
            tracing::error!("docker connection failed: {e}");
            None
        }
    };

    if engine.is_none() {
        tracing::warn!("container features disabled; ensure Docker is running and accessible");
    }

    let state = AppState {
        engine,
        auth: Auth::new(&config),
        filter: config.filter.clone(),
    };
    let router = build_router(state, config.static_dir.as_deref());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("dockwatch server listening on {addr}");
    axum::serve(listener, router).await?;
    Ok(())
}
