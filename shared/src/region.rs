use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `[longitude, latitude]` in degrees.
pub type Position = [f64; 2];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// GeoJSON geometry kept loosely typed; only polygonal kinds are ever drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Value,
}

impl Geometry {
    /// Shape of a `Polygon` or `MultiPolygon` geometry, x = longitude and
    /// y = latitude. Other kinds yield an empty shape.
    pub fn shape(&self) -> MultiPolygon<f64> {
        let polygons = match self.kind.as_str() {
            "Polygon" => parse_polygon(&self.coordinates).into_iter().collect(),
            "MultiPolygon" => self
                .coordinates
                .as_array()
                .map(|parts| parts.iter().filter_map(parse_polygon).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        MultiPolygon::new(polygons)
    }
}

// First ring is the exterior, the rest are holes.
fn parse_polygon(value: &Value) -> Option<Polygon<f64>> {
    let mut rings = value.as_array()?.iter().filter_map(parse_ring);
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

fn parse_ring(value: &Value) -> Option<LineString<f64>> {
    let coords: Vec<Coord<f64>> = value
        .as_array()?
        .iter()
        .filter_map(parse_coord)
        .collect();
    (coords.len() >= 3).then(|| LineString::new(coords))
}

// Altitude and any further members are dropped.
fn parse_coord(value: &Value) -> Option<Coord<f64>> {
    let coords = value.as_array()?;
    let x = coords.first()?.as_f64()?;
    let y = coords.get(1)?.as_f64()?;
    Some(Coord { x, y })
}

impl Feature {
    /// Non-empty string value of `key` in the feature properties.
    pub fn area_name(&self, key: &str) -> Option<&str> {
        self.properties
            .as_ref()?
            .get(key)?
            .as_str()
            .filter(|name| !name.is_empty())
    }

    pub fn shape(&self) -> MultiPolygon<f64> {
        self.geometry
            .as_ref()
            .map(Geometry::shape)
            .unwrap_or_else(|| MultiPolygon::new(Vec::new()))
    }
}

impl FeatureCollection {
    /// Sorted, de-duplicated area names found under `key`.
    pub fn area_names(&self, key: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .features
            .iter()
            .filter_map(|feature| feature.area_name(key))
            .map(str::to_owned)
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
