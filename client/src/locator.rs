use std::collections::HashMap;
use std::fmt;

use visitmap_shared::Position;

use crate::console;
use crate::layers::{FeatureLayer, Layer, LayerId, RegionMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateError {
    MissingMap,
    MissingAreaProperty,
}

impl fmt::Display for LocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateError::MissingMap => f.write_str("invalid map instance provided"),
            LocateError::MissingAreaProperty => {
                f.write_str("invalid area property name provided")
            }
        }
    }
}

/// Click binding for one region feature layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionBinding {
    pub layer_id: LayerId,
    pub area_name: String,
}

/// At most one click binding per feature layer.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: HashMap<LayerId, RegionBinding>,
}

impl BindingRegistry {
    /// Bind a layer, replacing whatever binding it had before.
    pub fn bind(&mut self, binding: RegionBinding) -> Option<RegionBinding> {
        self.bindings.insert(binding.layer_id, binding)
    }

    pub fn has_binding(&self, layer_id: LayerId) -> bool {
        self.bindings.contains_key(&layer_id)
    }

    pub fn get(&self, layer_id: LayerId) -> Option<&RegionBinding> {
        self.bindings.get(&layer_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Region features reachable from the map's top-level layers, including the
/// direct children of top-level groups. Deeper nesting is not searched.
pub fn locate_regions(map: &RegionMap, area_property: &str) -> Vec<RegionBinding> {
    let mut found = Vec::new();
    for layer in map.layers() {
        match layer {
            Layer::Base { .. } => {}
            Layer::Feature(feature) => found.extend(region_binding(feature, area_property)),
            Layer::Group { children, .. } => {
                for child in children {
                    if let Layer::Feature(feature) = child {
                        found.extend(region_binding(feature, area_property));
                    }
                }
            }
        }
    }
    found
}

fn region_binding(layer: &FeatureLayer, area_property: &str) -> Option<RegionBinding> {
    let area_name = layer.area_name(area_property)?;
    Some(RegionBinding {
        layer_id: layer.id,
        area_name: area_name.to_owned(),
    })
}

/// Binding of the topmost bound region under `position`. Layers drawn over a
/// region without a binding of their own do not hide it.
pub fn binding_at<'a>(
    map: &RegionMap,
    registry: &'a BindingRegistry,
    position: Position,
) -> Option<&'a RegionBinding> {
    map.hits_at(position)
        .into_iter()
        .find_map(|layer_id| registry.get(layer_id))
}

/// Bind every region feature of `map` for clicks.
///
/// Invalid input is logged and returned as an error without touching the
/// registry. Calling this again rebinds in place, never duplicating bindings.
pub fn initialize_map_interaction(
    map: Option<&RegionMap>,
    area_property: Option<&str>,
    registry: &mut BindingRegistry,
) -> Result<usize, LocateError> {
    let Some(map) = map else {
        console::error(&format!(
            "initialize_map_interaction: {}",
            LocateError::MissingMap
        ));
        return Err(LocateError::MissingMap);
    };
    let Some(area_property) = area_property.filter(|property| !property.is_empty()) else {
        console::error(&format!(
            "initialize_map_interaction: {}",
            LocateError::MissingAreaProperty
        ));
        return Err(LocateError::MissingAreaProperty);
    };

    console::info(&format!(
        "Initializing interactions for map {} using property '{area_property}'",
        map.container_id
    ));
    let regions = locate_regions(map, area_property);
    let count = regions.len();
    for binding in regions {
        registry.bind(binding);
    }
    console::info(&format!("Click bindings attached for {count} regions"));
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::RegionStyle;
    use crate::layers::tests::{region, sample_map};
    use serde_json::json;

    #[test]
    fn missing_inputs_abort_without_binding() {
        let map = sample_map(&[]);
        let mut registry = BindingRegistry::default();

        assert_eq!(
            initialize_map_interaction(None, Some("COUNTYNAME"), &mut registry),
            Err(LocateError::MissingMap)
        );
        assert_eq!(
            initialize_map_interaction(Some(&map), None, &mut registry),
            Err(LocateError::MissingAreaProperty)
        );
        assert_eq!(
            initialize_map_interaction(Some(&map), Some(""), &mut registry),
            Err(LocateError::MissingAreaProperty)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn binds_each_named_region_once() {
        let map = sample_map(&[]);
        let mut registry = BindingRegistry::default();

        assert_eq!(
            initialize_map_interaction(Some(&map), Some("COUNTYNAME"), &mut registry),
            Ok(3)
        );
        for feature in map.features() {
            assert!(registry.has_binding(feature.id));
        }
        let Layer::Base { id: base_id } = map.layers()[0] else {
            panic!("first layer is the background");
        };
        assert!(!registry.has_binding(base_id));
    }

    #[test]
    fn reinitializing_keeps_one_binding_per_region() {
        let map = sample_map(&[]);
        let mut registry = BindingRegistry::default();

        initialize_map_interaction(Some(&map), Some("COUNTYNAME"), &mut registry)
            .expect("first init");
        initialize_map_interaction(Some(&map), Some("COUNTYNAME"), &mut registry)
            .expect("second init");

        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn skips_layers_without_usable_metadata_and_deep_nesting() {
        let mut map = RegionMap::new("map");
        let unnamed_feature = serde_json::from_value(json!({
            "type": "Feature",
            "properties": { "NAME": "other" },
            "geometry": null
        }))
        .expect("valid feature");

        let top_level = map.feature_layer(Some(region("金門縣", 118.0, 24.0)), RegionStyle::UNVISITED);
        let top_level_id = top_level.id();
        let bare = map.feature_layer(None, RegionStyle::UNVISITED);
        let unnamed = map.feature_layer(Some(unnamed_feature), RegionStyle::UNVISITED);
        let deep = map.feature_layer(Some(region("連江縣", 119.0, 26.0)), RegionStyle::UNVISITED);
        let deep_id = deep.id();
        let inner_group = map.group_layer(vec![deep]);
        let child = map.feature_layer(Some(region("澎湖縣", 119.5, 23.5)), RegionStyle::UNVISITED);
        let child_id = child.id();
        let outer_group = map.group_layer(vec![bare, unnamed, inner_group, child]);
        map.push(top_level);
        map.push(outer_group);

        let found = locate_regions(&map, "COUNTYNAME");
        let ids: Vec<LayerId> = found.iter().map(|binding| binding.layer_id).collect();
        assert_eq!(ids, vec![top_level_id, child_id]);
        assert!(!ids.contains(&deep_id));
        assert_eq!(found[1].area_name, "澎湖縣");
    }

    #[test]
    fn unbound_overlay_does_not_hide_region_below() {
        let mut map = sample_map(&[]);
        let mut registry = BindingRegistry::default();
        initialize_map_interaction(Some(&map), Some("COUNTYNAME"), &mut registry)
            .expect("init");

        let label = serde_json::from_value(json!({
            "type": "Feature",
            "properties": { "label": "Taipei 101" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[121.2, 25.2], [121.8, 25.2], [121.8, 25.8], [121.2, 25.8], [121.2, 25.2]]]
            }
        }))
        .expect("valid feature");
        let overlay = map.feature_layer(Some(label), RegionStyle::UNVISITED);
        let overlay_id = overlay.id();
        map.push(overlay);

        assert_eq!(map.find_at([121.5, 25.5]), Some(overlay_id));
        assert!(!registry.has_binding(overlay_id));
        let binding = binding_at(&map, &registry, [121.5, 25.5]).expect("region below");
        assert_eq!(binding.area_name, "臺北市");
        assert_eq!(binding_at(&map, &registry, [0.0, 0.0]), None);
    }
}
