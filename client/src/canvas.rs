use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{
    CanvasRenderingContext2d, CanvasWindingRule, HtmlCanvasElement, MouseEvent, PointerEvent,
    WheelEvent,
};

use crate::click::{HttpSubmitter, submit_area};
use crate::console;
use crate::dom;
use crate::layers::{FeatureLayer, Layer, RegionMap};
use crate::locator::{BindingRegistry, RegionBinding, binding_at};
use crate::viewport::Viewport;

/// Pointer travel (CSS px) below which a press/release counts as a click.
const CLICK_SLOP_PX: f64 = 5.0;
const BACKGROUND_FILL: &str = "#e9eef1";

struct ResizeBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn()>,
}

impl ResizeBinding {
    fn detach(&self) {
        self.window
            .remove_event_listener_with_callback("resize", self.handler.as_ref().unchecked_ref())
            .ok();
    }
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

fn watch_resize(tick: RwSignal<u32>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let handler = Closure::<dyn Fn()>::new(move || {
        tick.try_update(|t| *t = t.wrapping_add(1));
    });
    if window
        .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
        .is_err()
    {
        console::warn("Could not watch window resize");
        return;
    }
    RESIZE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().replace(ResizeBinding { window, handler }) {
            old.detach();
        }
    });
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, String> {
    canvas
        .get_context("2d")
        .map_err(|e| format!("get_context failed: {e:?}"))?
        .ok_or_else(|| "2d context unavailable".to_string())?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| "not a 2d context".to_string())
}

fn trace_feature(ctx: &CanvasRenderingContext2d, layer: &FeatureLayer, vp: &Viewport) {
    ctx.begin_path();
    for polygon in &layer.shape.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            for (index, coord) in ring.coords().enumerate() {
                let (x, y) = vp.position_to_screen([coord.x, coord.y]);
                if index == 0 {
                    ctx.move_to(x, y);
                } else {
                    ctx.line_to(x, y);
                }
            }
            ctx.close_path();
        }
    }
}

fn draw_feature(ctx: &CanvasRenderingContext2d, layer: &FeatureLayer, vp: &Viewport) {
    if layer.shape.0.is_empty() {
        return;
    }
    let style = layer.style;
    trace_feature(ctx, layer, vp);
    ctx.set_global_alpha(style.fill_opacity);
    ctx.set_fill_style_str(style.fill_color);
    ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
    ctx.set_global_alpha(1.0);
    ctx.set_stroke_style_str(style.stroke_color);
    ctx.set_line_width(style.stroke_weight);
    ctx.stroke();
}

fn draw_layer(ctx: &CanvasRenderingContext2d, layer: &Layer, vp: &Viewport, w: f64, h: f64) {
    match layer {
        Layer::Base { .. } => {
            ctx.set_fill_style_str(BACKGROUND_FILL);
            ctx.fill_rect(0.0, 0.0, w, h);
        }
        Layer::Feature(feature) => draw_feature(ctx, feature, vp),
        Layer::Group { children, .. } => {
            for child in children {
                draw_layer(ctx, child, vp, w, h);
            }
        }
    }
}

/// Size the backing store to the container and draw every layer in order.
fn draw_map(
    canvas: &HtmlCanvasElement,
    map: Option<&RegionMap>,
    vp: &Viewport,
) -> Result<(), String> {
    let Some(parent) = canvas.parent_element() else {
        return Ok(());
    };
    let w = parent.client_width() as f64;
    let h = parent.client_height() as f64;
    if w <= 0.0 || h <= 0.0 {
        return Ok(());
    }
    let dpr = web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0);
    let pw = (w * dpr).round().max(1.0) as u32;
    let ph = (h * dpr).round().max(1.0) as u32;
    if canvas.width() != pw || canvas.height() != ph {
        canvas.set_width(pw);
        canvas.set_height(ph);
    }

    let ctx = context_2d(canvas)?;
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)
        .map_err(|e| format!("set_transform failed: {e:?}"))?;
    ctx.clear_rect(0.0, 0.0, w, h);
    if let Some(map) = map {
        for layer in map.layers() {
            draw_layer(&ctx, layer, vp, w, h);
        }
    }
    Ok(())
}

/// Canvas size in CSS pixels, or `None` before layout.
pub fn canvas_size(canvas: &HtmlCanvasElement) -> Option<(f64, f64)> {
    let parent = canvas.parent_element()?;
    let size = (parent.client_width() as f64, parent.client_height() as f64);
    (size.0 > 0.0 && size.1 > 0.0).then_some(size)
}

fn local_point(canvas: Option<HtmlCanvasElement>, e: &MouseEvent) -> (f64, f64) {
    canvas
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            (
                e.client_x() as f64 - rect.left(),
                e.client_y() as f64 - rect.top(),
            )
        })
        .unwrap_or((e.offset_x() as f64, e.offset_y() as f64))
}

/// Send the add request for a clicked region and apply the result when it
/// arrives. Each click runs as its own task.
pub fn spawn_region_click(binding: RegionBinding, map: RwSignal<Option<RegionMap>>) {
    wasm_bindgen_futures::spawn_local(async move {
        let outcome = submit_area(&HttpSubmitter, &binding.area_name).await;
        let applied = map.try_update(|map| match map {
            Some(map) => {
                dom::finish_click(&binding, &outcome, map);
                true
            }
            None => false,
        });
        if applied != Some(true) {
            console::warn(&format!(
                "Map gone before the response for {} arrived",
                binding.area_name
            ));
        }
    });
}

/// Region map drawn on a 2D canvas with wheel zoom, drag pan and click
/// dispatch to bound regions.
#[component]
pub fn RegionMapCanvas() -> impl IntoView {
    let map: RwSignal<Option<RegionMap>> = expect_context();
    let registry: RwSignal<BindingRegistry> = expect_context();
    let viewport: RwSignal<Viewport> = expect_context();
    let canvas_ref: NodeRef<leptos::html::Canvas> = expect_context();

    let resize_tick = RwSignal::new(0u32);
    watch_resize(resize_tick);

    let is_dragging = Rc::new(Cell::new(false));
    let drag_start_x = Rc::new(Cell::new(0.0f64));
    let drag_start_y = Rc::new(Cell::new(0.0f64));
    let last_x = Rc::new(Cell::new(0.0f64));
    let last_y = Rc::new(Cell::new(0.0f64));

    Effect::new(move || {
        resize_tick.track();
        let vp = viewport.get();
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        let canvas: &HtmlCanvasElement = &canvas;
        map.with(|map| {
            if let Err(e) = draw_map(canvas, map.as_ref(), &vp) {
                console::warn(&format!("Map draw failed: {e}"));
            }
        });
    });

    let bound_region_at = move |local: (f64, f64)| -> Option<RegionBinding> {
        let position = viewport.with_untracked(|vp| vp.screen_to_position(local.0, local.1));
        map.with_untracked(|map| {
            let map = map.as_ref()?;
            registry.with_untracked(|registry| binding_at(map, registry, position).cloned())
        })
    };

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let delta = e.delta_y();
        let x = e.offset_x() as f64;
        let y = e.offset_y() as f64;
        viewport.update(|vp| vp.zoom_at(delta, x, y));
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let drag_start_x = drag_start_x.clone();
        let drag_start_y = drag_start_y.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            is_dragging.set(true);
            drag_start_x.set(e.client_x() as f64);
            drag_start_y.set(e.client_y() as f64);
            last_x.set(e.client_x() as f64);
            last_y.set(e.client_y() as f64);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            if is_dragging.get() {
                let dx = e.client_x() as f64 - last_x.get();
                let dy = e.client_y() as f64 - last_y.get();
                last_x.set(e.client_x() as f64);
                last_y.set(e.client_y() as f64);
                viewport.update(|vp| vp.pan(dx, dy));
                return;
            }
            let over_region = bound_region_at(local_point(canvas_ref.get_untracked(), &e)).is_some();
            if let Some(el) = canvas_ref.get_untracked() {
                let cursor = if over_region { "pointer" } else { "grab" };
                AsRef::<web_sys::HtmlElement>::as_ref(&el)
                    .style()
                    .set_property("cursor", cursor)
                    .ok();
            }
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "grab").ok();
            }
        }
    };

    let on_click = move |e: MouseEvent| {
        let dx = (e.client_x() as f64 - drag_start_x.get()).abs();
        let dy = (e.client_y() as f64 - drag_start_y.get()).abs();
        if dx >= CLICK_SLOP_PX || dy >= CLICK_SLOP_PX {
            return;
        }
        let Some(binding) = bound_region_at(local_point(canvas_ref.get_untracked(), &e)) else {
            return;
        };
        e.prevent_default();
        e.stop_propagation();
        spawn_region_click(binding, map);
    };

    view! {
        <canvas
            node_ref=canvas_ref
            style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:click=on_click
        />
    }
}
