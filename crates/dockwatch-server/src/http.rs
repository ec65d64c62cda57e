//! HTTP surface: login, verify, container listing, health, static assets.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use dockwatch_core::FilterConfig;
use dockwatch_docker::DockerEngine;

use crate::auth::{Auth, Claims};
use crate::ws::ws_handler;

/// Message returned whenever the engine cannot be reached.
const DOCKER_UNAVAILABLE: &str =
    "Docker is not available. Please ensure Docker is running and accessible.";

/// Shared per-process state.
#[derive(Clone)]
pub struct AppState {
    /// Engine handle; `None` when the daemon was unreachable at startup.
    pub engine: Option<Arc<DockerEngine>>,
    /// Token issuer/verifier.
    pub auth: Auth,
    /// Process-wide monitoring allow-lists.
    pub filter: FilterConfig,
}

/// Assemble the full router: API routes, the WebSocket upgrade, permissive
/// CORS, and optionally the built frontend as a static fallback.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .route("/api/login", post(login))
        .route("/api/verify", get(verify))
        .route("/api/containers", get(list_containers))
        .route("/api/health", get(health))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    if let Some(dir) = static_dir {
        let index = dir.join("index.html");
        router = router
            .fallback_service(ServeDir::new(dir).not_found_service(ServeFile::new(index)));
    }

    router
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    match state.auth.login(&request.username, &request.password) {
        Ok(token) => (
            StatusCode::OK,
            Json(json!({
                "token": token,
                "user": { "username": request.username },
            })),
        ),
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid username or password" })),
        ),
    }
}

async fn verify(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    match bearer_claims(&state, &headers) {
        Some(claims) => (
            StatusCode::OK,
            Json(json!({ "user": { "username": claims.sub } })),
        ),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid or expired token" })),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    /// Include stopped containers as well.
    #[serde(default)]
    all: bool,
}

async fn list_containers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    if bearer_claims(&state, &headers).is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid or expired token" })),
        );
    }

    let Some(engine) = &state.engine else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": DOCKER_UNAVAILABLE,
                "containers": [],
            })),
        );
    };

    match engine.list_unfiltered(query.all).await {
        Ok(containers) => {
            let total = containers.len();
            let containers: Vec<_> = containers
                .into_iter()
                .filter(|container| state.filter.matches(container))
                .collect();
            let filtered = containers.len();
            (
                StatusCode::OK,
                Json(json!({
                    "containers": containers,
                    "filter": state.filter.describe(),
                    "total": total,
                    "filtered": filtered,
                })),
            )
        }
        Err(e) => {
            tracing::error!("error fetching containers: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch containers" })),
            )
        }
    }
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    // Reachability is probed per call, not cached from startup.
    let docker = match &state.engine {
        Some(engine) if engine.ping().await.is_ok() => "connected",
        _ => "unavailable",
    };

    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "docker": docker,
    }))
}

/// Extract and verify the request's bearer token.
fn bearer_claims(state: &AppState, headers: &HeaderMap) -> Option<Claims> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    state.auth.verify(token).ok()
}
