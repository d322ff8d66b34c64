//! Sidebar <-> DOM: hydrate the model from the server-rendered page and
//! project it back after each change.

use std::cell::RefCell;

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlOptionElement};

use crate::click::{ClickOutcome, apply_outcome};
use crate::console;
use crate::feedback::{FEEDBACK_FADE_MS, FEEDBACK_VISIBLE_MS, FeedbackBanner, FeedbackToken};
use crate::layers::RegionMap;
use crate::locator::RegionBinding;
use crate::sidebar::{
    AREA_SELECT_ID, AreaSelect, EMPTY_MESSAGE_CLASS, FEEDBACK_ID, SelectOption, Sidebar,
    VISITED_COUNT_ID, VISITED_LIST_ID, VisitedCount, VisitedList,
};

thread_local! {
    static SIDEBAR: RefCell<Sidebar> = RefCell::new(Sidebar::default());
}

pub fn document() -> Option<Document> {
    web_sys::window()?.document()
}

/// Run `f` against the page's sidebar model. Never hold this across an await.
pub fn with_sidebar<R>(f: impl FnOnce(&mut Sidebar) -> R) -> R {
    SIDEBAR.with(|sidebar| f(&mut sidebar.borrow_mut()))
}

fn element_text(element: &Element) -> String {
    element.text_content().unwrap_or_default().trim().to_string()
}

fn children(element: &Element) -> Vec<Element> {
    let collection = element.children();
    (0..collection.length())
        .filter_map(|index| collection.item(index))
        .collect()
}

fn read_visited_list(element: &Element) -> VisitedList {
    let mut entries = Vec::new();
    let mut placeholder = None;
    for item in children(element) {
        if item.class_list().contains(EMPTY_MESSAGE_CLASS) {
            placeholder = Some(element_text(&item));
        } else {
            entries.push(element_text(&item));
        }
    }
    VisitedList::new(entries, placeholder)
}

fn option_value(element: &Element) -> String {
    match element.dyn_ref::<HtmlOptionElement>() {
        Some(option) => option.value(),
        None => element.get_attribute("value").unwrap_or_default(),
    }
}

fn read_area_select(element: &Element) -> AreaSelect {
    AreaSelect::new(
        children(element)
            .iter()
            .map(|option| SelectOption::new(option_value(option), element_text(option)))
            .collect(),
    )
}

/// Build the sidebar model from the current page. Missing elements become
/// `None` parts.
pub fn read_sidebar(document: &Document) -> Sidebar {
    Sidebar {
        list: document
            .get_element_by_id(VISITED_LIST_ID)
            .map(|el| read_visited_list(&el)),
        select: document
            .get_element_by_id(AREA_SELECT_ID)
            .map(|el| read_area_select(&el)),
        count: document
            .get_element_by_id(VISITED_COUNT_ID)
            .map(|el| VisitedCount::new(element_text(&el))),
        feedback: document
            .get_element_by_id(FEEDBACK_ID)
            .map(|_| FeedbackBanner::default()),
    }
}

pub fn hydrate_sidebar() {
    let Some(document) = document() else {
        console::error("No document; sidebar not hydrated");
        return;
    };
    let sidebar = read_sidebar(&document);
    console::info(&format!(
        "Sidebar hydrated: {} visited, {} options",
        sidebar.list.as_ref().map_or(0, VisitedList::len),
        sidebar.select.as_ref().map_or(0, |select| select.options().len()),
    ));
    with_sidebar(|slot| *slot = sidebar);
}

fn render_visited_list(document: &Document, list: &VisitedList) -> Result<(), String> {
    let Some(element) = document.get_element_by_id(VISITED_LIST_ID) else {
        return Ok(());
    };
    while let Some(child) = element.first_child() {
        element
            .remove_child(&child)
            .map_err(|e| format!("remove list item: {e:?}"))?;
    }
    if let Some(text) = list.placeholder() {
        let item = document
            .create_element("li")
            .map_err(|e| format!("create placeholder: {e:?}"))?;
        item.set_class_name(EMPTY_MESSAGE_CLASS);
        item.set_text_content(Some(text));
        element
            .append_child(&item)
            .map_err(|e| format!("append placeholder: {e:?}"))?;
    }
    for entry in list.entries() {
        let item = document
            .create_element("li")
            .map_err(|e| format!("create list item: {e:?}"))?;
        item.set_text_content(Some(entry));
        element
            .append_child(&item)
            .map_err(|e| format!("append list item: {e:?}"))?;
    }
    Ok(())
}

fn render_area_select(document: &Document, select: &AreaSelect) {
    let Some(element) = document.get_element_by_id(AREA_SELECT_ID) else {
        return;
    };
    for option in children(&element) {
        if !select.has_value(&option_value(&option)) {
            option.remove();
        }
    }
}

fn render_feedback(document: &Document, banner: &FeedbackBanner) -> Result<(), String> {
    let Some(element) = document
        .get_element_by_id(FEEDBACK_ID)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return Ok(());
    };
    let style = element.style();
    if let Some(message) = banner.message() {
        element.set_text_content(Some(&message.text));
        element.set_class_name(message.class_name());
        style
            .set_property("background-color", message.background())
            .map_err(|e| format!("banner background: {e:?}"))?;
    }
    style
        .set_property("opacity", &banner.opacity().to_string())
        .map_err(|e| format!("banner opacity: {e:?}"))?;
    style
        .set_property("display", if banner.is_visible() { "block" } else { "none" })
        .map_err(|e| format!("banner display: {e:?}"))?;
    Ok(())
}

/// Project the whole sidebar model onto the page.
pub fn render_sidebar() {
    let Some(document) = document() else {
        return;
    };
    let result = with_sidebar(|sidebar| {
        if let Some(list) = &sidebar.list {
            render_visited_list(&document, list)?;
        }
        if let Some(select) = &sidebar.select {
            render_area_select(&document, select);
        }
        if let Some(count) = &sidebar.count
            && let Some(element) = document.get_element_by_id(VISITED_COUNT_ID)
        {
            element.set_text_content(Some(&count.text));
        }
        if let Some(banner) = &sidebar.feedback {
            render_feedback(&document, banner)?;
        }
        Ok::<(), String>(())
    });
    if let Err(e) = result {
        console::error(&format!("Sidebar render failed: {e}"));
    }
}

fn render_banner_only() {
    let Some(document) = document() else {
        return;
    };
    let result = with_sidebar(|sidebar| match &sidebar.feedback {
        Some(banner) => render_feedback(&document, banner),
        None => Ok(()),
    });
    if let Err(e) = result {
        console::error(&format!("Feedback render failed: {e}"));
    }
}

/// Fade, then hide, the message identified by `token`. Timers that find a
/// newer message on screen do nothing.
pub fn schedule_feedback_timers(token: FeedbackToken) {
    wasm_bindgen_futures::spawn_local(async move {
        TimeoutFuture::new(FEEDBACK_VISIBLE_MS).await;
        let faded = with_sidebar(|sidebar| {
            sidebar
                .feedback
                .as_mut()
                .is_some_and(|banner| banner.begin_fade(token))
        });
        if !faded {
            return;
        }
        render_banner_only();

        TimeoutFuture::new(FEEDBACK_FADE_MS).await;
        let hidden = with_sidebar(|sidebar| {
            sidebar
                .feedback
                .as_mut()
                .is_some_and(|banner| banner.hide(token))
        });
        if hidden {
            render_banner_only();
        }
    });
}

/// Apply a finished click to the map and the page.
pub fn finish_click(binding: &RegionBinding, outcome: &ClickOutcome, map: &mut RegionMap) {
    let token = with_sidebar(|sidebar| apply_outcome(binding, outcome, map, sidebar));
    render_sidebar();
    if let Some(token) = token {
        schedule_feedback_timers(token);
    }
}
