use visitmap_shared::{AreaCatalog, FeatureCollection};

/// Fetch the region GeoJSON the map is drawn from.
pub async fn fetch_regions() -> Result<FeatureCollection, String> {
    let resp = gloo_net::http::Request::get("/api/regions")
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<FeatureCollection>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// Fetch available and visited area names.
pub async fn fetch_areas() -> Result<AreaCatalog, String> {
    let resp = gloo_net::http::Request::get("/api/areas")
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<AreaCatalog>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}
