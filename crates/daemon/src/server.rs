use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use common::{BackendRecord, HealthResponse, ServiceStatus};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::registry::ServiceRegistry;

#[derive(Clone)]
struct AppState {
    registry: Arc<ServiceRegistry>,
}

pub fn router(registry: Arc<ServiceRegistry>) -> Router {
    Router::new()
        .route("/services", get(list_services))
        .route("/services/{name}", get(service_status))
        .route("/services/{name}/backends", get(service_backends))
        .route("/services/{name}/health", get(service_health))
        .layer(CorsLayer::permissive())
        .with_state(AppState { registry })
}

async fn list_services(State(state): State<AppState>) -> Json<Vec<ServiceStatus>> {
    Json(state.registry.statuses())
}

async fn service_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ServiceStatus>, StatusCode> {
    state.registry.status(&name).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn service_backends(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<BackendRecord>>, StatusCode> {
    let watcher = state.registry.watcher(&name).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(watcher.backends().to_vec()))
}

async fn service_health(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<HealthResponse>), StatusCode> {
    let watcher = state.registry.watcher(&name).ok_or(StatusCode::NOT_FOUND)?;
    let healthy = watcher.ping().await;
    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((code, Json(HealthResponse { name, healthy })))
}
