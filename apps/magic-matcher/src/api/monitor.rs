//! Monitoring endpoints: liveness, readiness, version and slug.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::server::{HealthCheckFuture, health_router, run_health_checks};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SlugResponse {
    pub slug: String,
}

pub fn router(state: AppState) -> Router {
    let app = state.settings.app;

    Router::new()
        .route("/ready", get(ready_handler))
        .route("/monitor/version", get(version_handler))
        .route("/monitor/slug", get(slug_handler))
        .with_state(state)
        .merge(health_router(app))
}

/// 200 only while the Milvus client is stored and open.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let milvus = state.milvus().await;

    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "milvus",
        Box::pin(async move {
            match milvus {
                Some(client) if !client.is_closed() => Ok(()),
                Some(_) => Err("Milvus client is closed".to_string()),
                None => Err("Milvus client is not initialised".to_string()),
            }
        }),
    )];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}

pub async fn version_handler(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: state.settings.app.version,
    })
}

pub async fn slug_handler(State(state): State<AppState>) -> Json<SlugResponse> {
    Json(SlugResponse {
        slug: state.settings.app.slug(),
    })
}
