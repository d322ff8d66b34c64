use geo::{BoundingRect, Contains, MultiPolygon, Point, Rect};
use visitmap_shared::{Feature, FeatureCollection, Position};

pub type LayerId = u32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStyle {
    pub fill_color: &'static str,
    pub fill_opacity: f64,
    pub stroke_color: &'static str,
    pub stroke_weight: f64,
}

impl RegionStyle {
    pub const UNVISITED: Self = Self {
        fill_color: "#808080",
        fill_opacity: 0.6,
        stroke_color: "black",
        stroke_weight: 0.5,
    };

    pub const VISITED: Self = Self {
        fill_color: "#008000",
        ..Self::UNVISITED
    };
}

/// A drawable layer carrying (optionally) one GeoJSON feature.
#[derive(Debug, Clone)]
pub struct FeatureLayer {
    pub id: LayerId,
    pub feature: Option<Feature>,
    pub shape: MultiPolygon<f64>,
    /// `None` when the feature has no polygonal geometry.
    pub bounds: Option<Rect<f64>>,
    pub style: RegionStyle,
}

impl FeatureLayer {
    pub fn area_name(&self, area_property: &str) -> Option<&str> {
        self.feature.as_ref()?.area_name(area_property)
    }

    pub fn contains(&self, position: Position) -> bool {
        let [x, y] = position;
        let point = Point::new(x, y);
        self.bounds.is_some_and(|bounds| bounds.contains(&point)) && self.shape.contains(&point)
    }
}

#[derive(Debug, Clone)]
pub enum Layer {
    /// Layer without feature data, e.g. the background.
    Base { id: LayerId },
    Feature(FeatureLayer),
    Group { id: LayerId, children: Vec<Layer> },
}

impl Layer {
    pub fn id(&self) -> LayerId {
        match self {
            Layer::Base { id, .. } | Layer::Group { id, .. } => *id,
            Layer::Feature(layer) => layer.id,
        }
    }

    fn find_feature(&self, id: LayerId) -> Option<&FeatureLayer> {
        match self {
            Layer::Base { .. } => None,
            Layer::Feature(layer) => (layer.id == id).then_some(layer),
            Layer::Group { children, .. } => {
                children.iter().find_map(|child| child.find_feature(id))
            }
        }
    }

    fn find_feature_mut(&mut self, id: LayerId) -> Option<&mut FeatureLayer> {
        match self {
            Layer::Base { .. } => None,
            Layer::Feature(layer) => (layer.id == id).then_some(layer),
            Layer::Group { children, .. } => children
                .iter_mut()
                .find_map(|child| child.find_feature_mut(id)),
        }
    }

    fn visit_features<'a>(&'a self, visit: &mut dyn FnMut(&'a FeatureLayer)) {
        match self {
            Layer::Base { .. } => {}
            Layer::Feature(layer) => visit(layer),
            Layer::Group { children, .. } => {
                for child in children {
                    child.visit_features(visit);
                }
            }
        }
    }

    // Pushes hits bottom to top.
    fn collect_hits(&self, position: Position, hits: &mut Vec<LayerId>) {
        match self {
            Layer::Base { .. } => {}
            Layer::Feature(layer) => {
                if layer.contains(position) {
                    hits.push(layer.id);
                }
            }
            Layer::Group { children, .. } => {
                for child in children {
                    child.collect_hits(position, hits);
                }
            }
        }
    }
}

/// The map instance: an ordered layer tree, drawn first to last.
#[derive(Debug, Clone)]
pub struct RegionMap {
    pub container_id: String,
    layers: Vec<Layer>,
    next_id: LayerId,
}

impl RegionMap {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            layers: Vec::new(),
            next_id: 1,
        }
    }

    /// Build a map with a background layer and one group holding every
    /// feature of `collection`. Features named in `visited` start restyled.
    pub fn from_collection(
        container_id: impl Into<String>,
        collection: &FeatureCollection,
        area_property: &str,
        visited: &[String],
    ) -> Self {
        let mut map = Self::new(container_id);
        let background = map.base_layer();
        map.push(background);

        let children = collection
            .features
            .iter()
            .map(|feature| {
                let is_visited = feature
                    .area_name(area_property)
                    .is_some_and(|name| visited.iter().any(|v| v == name));
                let style = if is_visited {
                    RegionStyle::VISITED
                } else {
                    RegionStyle::UNVISITED
                };
                map.feature_layer(Some(feature.clone()), style)
            })
            .collect();
        let group = map.group_layer(children);
        map.push(group);
        map
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn base_layer(&mut self) -> Layer {
        Layer::Base {
            id: self.allocate_id(),
        }
    }

    pub fn feature_layer(&mut self, feature: Option<Feature>, style: RegionStyle) -> Layer {
        let shape = feature
            .as_ref()
            .map(Feature::shape)
            .unwrap_or_else(|| MultiPolygon::new(Vec::new()));
        let bounds = shape.bounding_rect();
        Layer::Feature(FeatureLayer {
            id: self.allocate_id(),
            feature,
            shape,
            bounds,
            style,
        })
    }

    pub fn group_layer(&mut self, children: Vec<Layer>) -> Layer {
        Layer::Group {
            id: self.allocate_id(),
            children,
        }
    }

    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn feature(&self, id: LayerId) -> Option<&FeatureLayer> {
        self.layers.iter().find_map(|layer| layer.find_feature(id))
    }

    /// Restyle a feature layer. Returns `false` when no such layer exists.
    pub fn set_style(&mut self, id: LayerId, style: RegionStyle) -> bool {
        match self
            .layers
            .iter_mut()
            .find_map(|layer| layer.find_feature_mut(id))
        {
            Some(layer) => {
                layer.style = style;
                true
            }
            None => false,
        }
    }

    /// Every feature layer at any depth, in draw order.
    pub fn features(&self) -> Vec<&FeatureLayer> {
        let mut out = Vec::new();
        for layer in &self.layers {
            layer.visit_features(&mut |feature| out.push(feature));
        }
        out
    }

    /// Every feature layer containing `position` (longitude, latitude),
    /// topmost first.
    pub fn hits_at(&self, position: Position) -> Vec<LayerId> {
        let mut hits = Vec::new();
        for layer in &self.layers {
            layer.collect_hits(position, &mut hits);
        }
        hits.reverse();
        hits
    }

    /// Topmost feature layer containing `position`.
    pub fn find_at(&self, position: Position) -> Option<LayerId> {
        self.hits_at(position).into_iter().next()
    }

    /// Rectangle around every feature, `None` when nothing has geometry.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let polygons = self
            .features()
            .into_iter()
            .flat_map(|layer| layer.shape.0.iter().cloned())
            .collect::<Vec<_>>();
        MultiPolygon::new(polygons).bounding_rect()
    }

    pub fn area_bounds(&self, area_property: &str, area_name: &str) -> Option<Rect<f64>> {
        self.features()
            .into_iter()
            .find(|layer| layer.area_name(area_property) == Some(area_name))
            .and_then(|layer| layer.bounds)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn region(name: &str, x: f64, y: f64) -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "properties": { "COUNTYNAME": name },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[x, y], [x + 1.0, y], [x + 1.0, y + 1.0], [x, y + 1.0], [x, y]]]
            }
        }))
        .expect("valid feature")
    }

    pub(crate) fn sample_map(visited: &[String]) -> RegionMap {
        let collection = FeatureCollection {
            features: vec![
                region("臺北市", 121.0, 25.0),
                region("臺中市", 120.0, 24.0),
                region("高雄市", 120.0, 22.0),
            ],
        };
        RegionMap::from_collection("map", &collection, "COUNTYNAME", visited)
    }

    #[test]
    fn from_collection_groups_features_under_one_layer() {
        let map = sample_map(&[]);
        assert_eq!(map.layers().len(), 2);
        assert!(matches!(map.layers()[0], Layer::Base { .. }));
        let Layer::Group { children, .. } = &map.layers()[1] else {
            panic!("second layer should be the region group");
        };
        assert_eq!(children.len(), 3);
        assert_eq!(map.features().len(), 3);
    }

    #[test]
    fn visited_features_start_restyled() {
        let map = sample_map(&["臺中市".to_string()]);
        for feature in map.features() {
            let expected = if feature.area_name("COUNTYNAME") == Some("臺中市") {
                RegionStyle::VISITED
            } else {
                RegionStyle::UNVISITED
            };
            assert_eq!(feature.style, expected);
        }
    }

    #[test]
    fn find_at_hits_feature_polygons() {
        let map = sample_map(&[]);
        let hit = map.find_at([121.5, 25.5]).expect("Taipei hit");
        assert_eq!(
            map.feature(hit).and_then(|layer| layer.area_name("COUNTYNAME")),
            Some("臺北市")
        );
        assert_eq!(map.find_at([0.0, 0.0]), None);
    }

    #[test]
    fn set_style_updates_only_target_layer() {
        let mut map = sample_map(&[]);
        let id = map.find_at([120.5, 24.5]).expect("Taichung hit");
        assert!(map.set_style(id, RegionStyle::VISITED));
        assert_eq!(map.feature(id).map(|l| l.style), Some(RegionStyle::VISITED));
        let restyled = map
            .features()
            .iter()
            .filter(|layer| layer.style == RegionStyle::VISITED)
            .count();
        assert_eq!(restyled, 1);
        assert!(!map.set_style(9_999, RegionStyle::VISITED));
    }

    #[test]
    fn bounds_cover_all_features_and_single_area() {
        let map = sample_map(&[]);
        let bounds = map.bounds().expect("map bounds");
        assert_eq!((bounds.min().x, bounds.min().y), (120.0, 22.0));
        assert_eq!((bounds.max().x, bounds.max().y), (122.0, 26.0));

        let taipei = map
            .area_bounds("COUNTYNAME", "臺北市")
            .expect("Taipei bounds");
        assert_eq!((taipei.min().x, taipei.max().y), (121.0, 26.0));
        assert!(map.area_bounds("COUNTYNAME", "新北市").is_none());
        assert!(RegionMap::new("map").bounds().is_none());
    }

    #[test]
    fn hits_at_lists_overlapping_layers_topmost_first() {
        let mut map = sample_map(&[]);
        let below = map.find_at([121.5, 25.5]).expect("Taipei hit");
        let overlay = map.feature_layer(Some(region("overlay", 121.2, 25.2)), RegionStyle::UNVISITED);
        let overlay_id = overlay.id();
        map.push(overlay);

        assert_eq!(map.hits_at([121.5, 25.5]), vec![overlay_id, below]);
        assert_eq!(map.hits_at([121.1, 25.1]), vec![below]);
        assert!(map.hits_at([0.0, 0.0]).is_empty());
    }
}
