use crate::api::{ApiError, SharedState};
use crate::query::{LookbackWindow, ShopAnalytics, shop_analytics};
use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;

pub fn routes() -> Router<SharedState> {
    Router::new().route("/{shop}", get(get_analytics))
}

#[derive(Debug, Deserialize)]
struct AnalyticsParams {
    period: Option<String>,
}

#[tracing::instrument(name = "GET /api/analytics/{shop}", skip(state, params))]
async fn get_analytics(
    State(state): State<SharedState>,
    Path(shop): Path<String>,
    params: Result<Query<AnalyticsParams>, QueryRejection>,
) -> Result<Json<ShopAnalytics>, ApiError> {
    let Query(params) = params?;
    let window = LookbackWindow::parse(params.period.as_deref());
    let analytics = shop_analytics(
        state.repo.as_ref(),
        &shop,
        window,
        Utc::now(),
        state.config.top_bundles_limit,
    )
    .await?;
    Ok(Json(analytics))
}
