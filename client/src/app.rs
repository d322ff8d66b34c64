use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use visitmap_shared::AreaCatalog;

use crate::api::{fetch_areas, fetch_regions};
use crate::canvas::{RegionMapCanvas, canvas_size};
use crate::console;
use crate::dom;
use crate::layers::RegionMap;
use crate::locator::{BindingRegistry, initialize_map_interaction};
use crate::viewport::Viewport;

pub const MAP_CONTAINER_ID: &str = "map";

/// Settings the page passes on the map container's `data-*` attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapConfig {
    pub container_id: String,
    pub area_property: Option<String>,
    pub focus_area: Option<String>,
}

impl MapConfig {
    pub fn from_container(container_id: &str) -> Self {
        let container = dom::document().and_then(|doc| doc.get_element_by_id(container_id));
        let attribute = |name: &str| {
            container
                .as_ref()
                .and_then(|el| el.get_attribute(name))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            container_id: container_id.to_string(),
            area_property: attribute("data-area-property"),
            focus_area: attribute("data-focus-area"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

async fn load_map(config: &MapConfig) -> Result<RegionMap, String> {
    let (regions, areas) = futures::join!(fetch_regions(), fetch_areas());
    let collection = regions.map_err(|e| format!("region data: {e}"))?;
    let catalog = areas.unwrap_or_else(|e| {
        console::warn(&format!("Area catalog unavailable, assuming nothing visited: {e}"));
        AreaCatalog::default()
    });
    Ok(RegionMap::from_collection(
        config.container_id.as_str(),
        &collection,
        config.area_property.as_deref().unwrap_or_default(),
        &catalog.visited,
    ))
}

fn fit_viewport(
    viewport: RwSignal<Viewport>,
    canvas_ref: NodeRef<leptos::html::Canvas>,
    map: &RegionMap,
    config: &MapConfig,
) {
    let Some((w, h)) = canvas_ref
        .get_untracked()
        .and_then(|canvas| canvas_size(&canvas))
    else {
        return;
    };
    let focus = match (&config.area_property, &config.focus_area) {
        (Some(property), Some(area)) => map.area_bounds(property, area),
        _ => None,
    };
    let Some(bounds) = focus.or_else(|| map.bounds()) else {
        return;
    };
    viewport.update(|vp| vp.fit_bounds(&bounds, w, h));
}

#[component]
pub fn App() -> impl IntoView {
    let map: RwSignal<Option<RegionMap>> = RwSignal::new(None);
    let registry: RwSignal<BindingRegistry> = RwSignal::new(BindingRegistry::default());
    let viewport: RwSignal<Viewport> = RwSignal::new(Viewport::default());
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let status = RwSignal::new(LoadStatus::Loading);

    provide_context(map);
    provide_context(registry);
    provide_context(viewport);
    provide_context(canvas_ref);

    dom::hydrate_sidebar();
    let config = MapConfig::from_container(MAP_CONTAINER_ID);

    spawn_local(async move {
        let region_map = match load_map(&config).await {
            Ok(region_map) => region_map,
            Err(e) => {
                console::error(&format!("Map failed to load: {e}"));
                status.set(LoadStatus::Failed(e));
                return;
            }
        };
        let bound = registry.try_update(|registry| {
            initialize_map_interaction(
                Some(&region_map),
                config.area_property.as_deref(),
                registry,
            )
        });
        if let Some(Err(e)) = bound {
            console::error(&format!("Regions are not clickable: {e}"));
        }
        fit_viewport(viewport, canvas_ref, &region_map, &config);
        map.set(Some(region_map));
        status.set(LoadStatus::Ready);
    });

    let overlay = move || match status.get() {
        LoadStatus::Ready => None,
        LoadStatus::Loading => Some("Loading map…".to_string()),
        LoadStatus::Failed(e) => Some(format!("Map unavailable: {e}")),
    };

    view! {
        <RegionMapCanvas />
        {move || overlay().map(|text| view! {
            <div style="position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; pointer-events: none; color: #444;">
                {text}
            </div>
        })}
    }
}
