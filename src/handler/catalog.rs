use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::{Manifest, resolve_catalog};
use crate::domain::ContentRecord;
use crate::service::QueryService;

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub metas: Vec<ContentRecord>,
}

impl CatalogResponse {
    fn empty() -> Self {
        Self { metas: Vec::new() }
    }
}

/// Optional catalog extras from the `search=..&skip=..` path segment.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CatalogExtra {
    pub search: Option<String>,
    pub skip: Option<usize>,
}

impl CatalogExtra {
    pub fn parse(raw: &str) -> Self {
        let mut extra = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "search" if !value.trim().is_empty() => {
                    extra.search = Some(value.trim().to_lowercase());
                }
                "skip" => extra.skip = value.trim().parse().ok(),
                _ => {}
            }
        }
        extra
    }
}

fn strip_json(segment: &str) -> &str {
    segment.strip_suffix(".json").unwrap_or(segment)
}

/// Handler for GET /manifest.json
pub async fn manifest_handler() -> Json<Manifest> {
    Json(Manifest::build())
}

/// Handler for GET /catalog/{type}/{id}.json
pub async fn catalog_handler(
    State(service): State<Arc<QueryService>>,
    Path((content_type, file)): Path<(String, String)>,
) -> Json<CatalogResponse> {
    serve_catalog(&service, &content_type, strip_json(&file), CatalogExtra::default()).await
}

/// Handler for GET /catalog/{type}/{id}/{extra}.json
pub async fn catalog_with_extra_handler(
    State(service): State<Arc<QueryService>>,
    Path((content_type, id, extra)): Path<(String, String, String)>,
) -> Json<CatalogResponse> {
    let extra = CatalogExtra::parse(strip_json(&extra));
    serve_catalog(&service, &content_type, &id, extra).await
}

async fn serve_catalog(
    service: &QueryService,
    content_type: &str,
    id: &str,
    extra: CatalogExtra,
) -> Json<CatalogResponse> {
    let Some(catalog) = resolve_catalog(content_type, id) else {
        debug!(%content_type, %id, "unknown catalog requested");
        return Json(CatalogResponse::empty());
    };

    let metas = service
        .query(catalog.content_type, extra.search.as_deref(), extra.skip)
        .await;
    info!(catalog = catalog.id, count = metas.len(), "catalog served");
    Json(CatalogResponse { metas })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_parses_search_and_skip() {
        assert_eq!(
            CatalogExtra::parse("search=The+Crown&skip=100"),
            CatalogExtra {
                search: Some("the crown".into()),
                skip: Some(100),
            }
        );
    }

    #[test]
    fn extra_ignores_unknown_and_malformed_values() {
        assert_eq!(
            CatalogExtra::parse("genre=Drama&skip=lots&search="),
            CatalogExtra::default()
        );
    }

    #[test]
    fn json_suffix_is_optional() {
        assert_eq!(strip_json("my-custom-list.json"), "my-custom-list");
        assert_eq!(strip_json("my-custom-list"), "my-custom-list");
    }
}
