mod api;
mod app;
mod canvas;
mod click;
mod collation;
mod console;
mod dom;
mod feedback;
mod layers;
mod locator;
mod sidebar;
mod viewport;

use leptos::mount::mount_to;
use std::any::Any;
use std::cell::RefCell;
use wasm_bindgen::JsCast;

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(document) = dom::document() else {
        return;
    };
    let Some(target) = document
        .get_element_by_id(app::MAP_CONTAINER_ID)
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
    else {
        console::error(&format!(
            "No #{} container on this page; map not started",
            app::MAP_CONTAINER_ID
        ));
        return;
    };

    APP_MOUNT_HANDLE.with(move |slot| {
        // Drop any previous mount so its effects stop touching shared state.
        let _old = slot.borrow_mut().take();
        let handle = mount_to(target, app::App);
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
