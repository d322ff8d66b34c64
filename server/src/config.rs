use std::path::PathBuf;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_GEOJSON_PATH: &str = "taiwan_counties.geojson";
pub const DEFAULT_AREA_PROPERTY: &str = "COUNTYNAME";
pub const DEFAULT_VISITED_AREAS_FILE: &str = "visited_taiwan_areas.json";
pub const DEFAULT_STATIC_DIR: &str = "client/dist";

/// Script the page loads to boot the wasm client, relative to the static dir.
pub const CLIENT_BOOTSTRAP_PATH: &str = "/pkg/visitmap_client.js";

pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn geojson_path() -> PathBuf {
    path_from_env("GEOJSON_PATH", DEFAULT_GEOJSON_PATH)
}

pub fn visited_areas_file() -> PathBuf {
    path_from_env("VISITED_AREAS_FILE", DEFAULT_VISITED_AREAS_FILE)
}

pub fn static_dir() -> PathBuf {
    path_from_env("STATIC_DIR", DEFAULT_STATIC_DIR)
}

/// GeoJSON property holding each region's display name.
pub fn area_property() -> String {
    std::env::var("AREA_PROPERTY")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_AREA_PROPERTY.to_owned())
}

fn path_from_env(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
