use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use visitmap_shared::AreaCatalog;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let visited = state.store.load().await.len();
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "areas": state.catalog.available.len(),
        "visited": visited,
        "area_property": state.catalog.area_property,
        "observability": {
            "add_requests_total": observability.add_requests_total,
            "areas_added_total": observability.areas_added_total,
            "duplicate_rejections_total": observability.duplicate_rejections_total,
            "invalid_requests_total": observability.invalid_requests_total,
            "persist_failures_total": observability.persist_failures_total,
        }
    }))
}

/// Serve the region GeoJSON exactly as loaded from disk.
pub async fn get_regions(State(state): State<AppState>) -> impl IntoResponse {
    json_bytes_response(state.catalog.geojson.clone(), "public, max-age=300")
}

pub async fn get_areas(State(state): State<AppState>) -> impl IntoResponse {
    let visited = state.store.load().await;
    let catalog = AreaCatalog {
        available: state.catalog.available.clone(),
        visited,
    };
    ([(header::CACHE_CONTROL, "no-store")], Json(catalog))
}

fn json_bytes_response(body: Bytes, cache_control: &'static str) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    response
}
