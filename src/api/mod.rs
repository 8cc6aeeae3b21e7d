//! HTTP surface: health probes plus the token-protected dashboard API.

pub mod auth;
pub mod error;
mod routes;

use crate::config::AppConfig;
use crate::storage::Repository;
use axum::{Router, http::Uri, middleware::from_fn_with_state};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub config: Arc<AppConfig>,
    pub access_token: String,
}

pub type SharedState = Arc<AppState>;

async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

pub fn construct_router(state: SharedState) -> Router {
    let api = Router::new()
        .nest("/stores", routes::stores::routes())
        .nest("/bundles", routes::bundles::routes())
        .nest("/analytics", routes::analytics::routes())
        .layer(from_fn_with_state(state.clone(), auth::require_bearer));

    Router::new()
        .nest("/health", routes::health::routes())
        .nest("/api", api)
        .fallback(unknown_route)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
