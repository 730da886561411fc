use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler::catalog::{catalog_handler, catalog_with_extra_handler, manifest_handler};
use crate::handler::health::health_handler;
use crate::service::QueryService;

/// Build the addon router: manifest, catalogs and health.
///
/// Addon clients run in browsers, so every route answers CORS preflights.
pub fn catalog_router(service: Arc<QueryService>) -> Router {
    Router::new()
        .route("/manifest.json", get(manifest_handler))
        .route("/catalog/{content_type}/{file}", get(catalog_handler))
        .route(
            "/catalog/{content_type}/{id}/{extra}",
            get(catalog_with_extra_handler),
        )
        .route("/health", get(health_handler))
        .with_state(service)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
