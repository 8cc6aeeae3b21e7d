use super::csv_attachment;
use crate::analyzer::inventory::BundleStatusStats;
use crate::api::{ApiError, SharedState};
use crate::export::bundles_csv;
use crate::listing::{ListingQuery, Page};
use crate::model::CatalogEntry;
use crate::query::{BundleCatalog, bundle_catalog};
use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    response::Response,
    routing::get,
};
use serde::Serialize;
use tracing::info;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_bundles))
        .route("/export.csv", get(export_bundles))
        .route("/{shop}", get(shop_bundles))
}

#[derive(Serialize)]
pub struct BundlesResponse {
    #[serde(flatten)]
    pub page: Page<CatalogEntry>,
    pub stats: BundleStatusStats,
}

#[tracing::instrument(name = "GET /api/bundles", skip(state, query))]
async fn list_bundles(
    State(state): State<SharedState>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Json<BundlesResponse>, ApiError> {
    let Query(query) = query?;
    let entries = bundle_catalog(state.repo.as_ref(), None).await?.into_entries();
    let stats = BundleStatusStats::from_entries(&entries);
    let total = entries.len();
    let selected = query.select(entries);

    Ok(Json(BundlesResponse {
        page: query.paginate(selected, total),
        stats,
    }))
}

#[tracing::instrument(name = "GET /api/bundles/export.csv", skip(state, query))]
async fn export_bundles(
    State(state): State<SharedState>,
    query: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let entries = bundle_catalog(state.repo.as_ref(), None).await?.into_entries();
    let selected = query.select(entries);
    info!("[export] {} bundles", selected.len());

    Ok(csv_attachment("bundles.csv", bundles_csv(&selected)?))
}

#[tracing::instrument(name = "GET /api/bundles/{shop}", skip(state))]
async fn shop_bundles(
    State(state): State<SharedState>,
    Path(shop): Path<String>,
) -> Result<Json<BundleCatalog>, ApiError> {
    Ok(Json(bundle_catalog(state.repo.as_ref(), Some(&shop)).await?))
}
