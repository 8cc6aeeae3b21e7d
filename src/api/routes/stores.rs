use super::csv_attachment;
use crate::analyzer::inventory::StoreOverview;
use crate::api::{ApiError, SharedState};
use crate::export::stores_csv;
use crate::listing::{ListingQuery, Page};
use crate::query::{StoreSummary, store_directory};
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    response::Response,
    routing::get,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_stores))
        .route("/export.csv", get(export_stores))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoresResponse {
    #[serde(flatten)]
    pub page: Page<StoreSummary>,
    pub overview: StoreOverview,
}

#[tracing::instrument(name = "GET /api/stores", skip(state, query))]
async fn list_stores(
    State(state): State<SharedState>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Json<StoresResponse>, ApiError> {
    let Query(query) = query?;
    let directory =
        store_directory(state.repo.as_ref(), Utc::now(), state.config.recent_install_days).await?;
    let total = directory.shopify_stores.len();
    let selected = query.select(directory.shopify_stores);

    Ok(Json(StoresResponse {
        page: query.paginate(selected, total),
        overview: directory.overview,
    }))
}

#[tracing::instrument(name = "GET /api/stores/export.csv", skip(state, query))]
async fn export_stores(
    State(state): State<SharedState>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let now = Utc::now();
    let directory = store_directory(state.repo.as_ref(), now, state.config.recent_install_days).await?;
    let selected = query.select(directory.shopify_stores);
    info!("[export] {} stores", selected.len());

    Ok(csv_attachment("shopify-stores.csv", stores_csv(&selected, now)?))
}
