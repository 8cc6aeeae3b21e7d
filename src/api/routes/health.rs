use crate::api::{ApiError, SharedState};
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::time::Instant;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(health))
        .route("/db", get(db_health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct DbHealthResponse {
    pub rtt: u128,
}

#[tracing::instrument(name = "GET /health")]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[tracing::instrument(name = "GET /health/db", skip(state))]
async fn db_health(State(state): State<SharedState>) -> Result<Json<DbHealthResponse>, ApiError> {
    let started = Instant::now();
    state.repo.ping().await?;
    Ok(Json(DbHealthResponse {
        rtt: started.elapsed().as_millis(),
    }))
}
