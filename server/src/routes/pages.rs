use std::fmt::Write as _;

use axum::Form;
use axum::extract::State;
use axum::response::{Html, Redirect};
use serde::Deserialize;
use tracing::{error, info};
use visitmap_shared::AreaCatalog;

use crate::config::CLIENT_BOOTSTRAP_PATH;
use crate::state::AppState;
use crate::store::AddOutcome;

#[derive(Debug, Default, Deserialize)]
pub struct AreaForm {
    #[serde(default)]
    pub area: Option<String>,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    render_index(&state, None).await
}

/// Form fallback for adding an area without the map. Re-renders the page
/// zoomed to the area when it was newly added.
pub async fn submit_area(State(state): State<AppState>, Form(form): Form<AreaForm>) -> Html<String> {
    let mut focus_area = None;
    if let Some(area) = form.area.filter(|area| !area.is_empty())
        && state.catalog.contains(&area)
    {
        match state.store.add(&area).await {
            Ok(AddOutcome::Added) => {
                info!(area = %area, "area marked visited from form");
                focus_area = Some(area);
            }
            Ok(AddOutcome::AlreadyVisited) => {}
            Err(e) => {
                state.observability.record_persist_failure();
                error!(error = %e, area = %area, "failed to persist visited areas");
            }
        }
    }
    render_index(&state, focus_area.as_deref()).await
}

pub async fn clear(State(state): State<AppState>) -> Redirect {
    if let Err(e) = state.store.clear().await {
        state.observability.record_persist_failure();
        error!(error = %e, "failed to clear visited areas");
    }
    Redirect::to("/")
}

async fn render_index(state: &AppState, focus_area: Option<&str>) -> Html<String> {
    let areas = AreaCatalog {
        available: state.catalog.available.clone(),
        visited: state.store.load().await,
    };
    let unvisited: Vec<&str> = areas.unvisited().collect();
    Html(render_page(&PageModel {
        area_property: &state.catalog.area_property,
        visited: &areas.visited,
        unvisited: &unvisited,
        focus_area,
    }))
}

pub(crate) struct PageModel<'a> {
    pub area_property: &'a str,
    pub visited: &'a [String],
    pub unvisited: &'a [&'a str],
    pub focus_area: Option<&'a str>,
}

const PAGE_STYLE: &str = "\
body { margin: 0; font-family: sans-serif; }
.layout { display: flex; height: 100vh; }
#map { flex: 1; position: relative; background: #aad3df; }
.sidebar { width: 300px; padding: 16px; overflow-y: auto; box-sizing: border-box; }
#visited-list li.empty-message { color: #888; font-style: italic; }
#feedback-message { position: fixed; bottom: 20px; left: 50%; transform: translateX(-50%);
  padding: 10px 20px; color: white; border-radius: 4px; transition: opacity 0.5s ease; z-index: 1000; }";

pub(crate) fn render_page(page: &PageModel<'_>) -> String {
    let mut html = String::with_capacity(4096);
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html lang=\"zh-Hant\">");
    let _ = writeln!(
        html,
        "<head><meta charset=\"utf-8\"><title>Visited areas</title><style>{PAGE_STYLE}</style></head>"
    );
    let _ = writeln!(html, "<body>");
    let _ = writeln!(html, "<main class=\"layout\">");

    let _ = write!(
        html,
        "<div id=\"map\" data-area-property=\"{}\"",
        escape_html(page.area_property)
    );
    if let Some(focus) = page.focus_area {
        let _ = write!(html, " data-focus-area=\"{}\"", escape_html(focus));
    }
    let _ = writeln!(html, "></div>");

    let _ = writeln!(html, "<aside class=\"sidebar\">");
    let _ = writeln!(
        html,
        "<h2>Visited (<span id=\"visited-count\">{}</span>)</h2>",
        page.visited.len()
    );
    let _ = writeln!(html, "<ul id=\"visited-list\">");
    if page.visited.is_empty() {
        let _ = writeln!(html, "<li class=\"empty-message\">No areas visited yet.</li>");
    }
    for area in page.visited {
        let _ = writeln!(html, "<li>{}</li>", escape_html(area));
    }
    let _ = writeln!(html, "</ul>");

    let _ = writeln!(html, "<form method=\"post\" action=\"/\">");
    let _ = writeln!(html, "<select id=\"area-select\" name=\"area\">");
    for area in page.unvisited {
        let escaped = escape_html(area);
        let _ = writeln!(html, "<option value=\"{escaped}\">{escaped}</option>");
    }
    let _ = writeln!(html, "</select>");
    let _ = writeln!(html, "<button type=\"submit\">Add</button>");
    let _ = writeln!(html, "</form>");
    let _ = writeln!(html, "<p><a href=\"/clear\">Clear list</a></p>");
    let _ = writeln!(html, "</aside>");
    let _ = writeln!(html, "</main>");

    let _ = writeln!(
        html,
        "<div id=\"feedback-message\" style=\"display: none;\"></div>"
    );
    let _ = writeln!(
        html,
        "<script type=\"module\">import init from '{CLIENT_BOOTSTRAP_PATH}'; init();</script>"
    );
    let _ = writeln!(html, "</body>");
    let _ = writeln!(html, "</html>");
    html
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("臺北市"), "臺北市");
    }

    #[test]
    fn empty_visited_list_renders_placeholder() {
        let html = render_page(&PageModel {
            area_property: "COUNTYNAME",
            visited: &[],
            unvisited: &["臺北市", "臺中市"],
            focus_area: None,
        });
        assert!(html.contains("<li class=\"empty-message\">"));
        assert!(html.contains("<span id=\"visited-count\">0</span>"));
        assert!(html.contains("<option value=\"臺北市\">臺北市</option>"));
        assert!(html.contains("data-area-property=\"COUNTYNAME\""));
        assert!(!html.contains("data-focus-area"));
        assert!(html.contains("id=\"feedback-message\""));
    }

    #[test]
    fn visited_entries_and_focus_area_render() {
        let visited = vec!["臺北市".to_string()];
        let html = render_page(&PageModel {
            area_property: "COUNTYNAME",
            visited: &visited,
            unvisited: &["臺中市"],
            focus_area: Some("臺北市"),
        });
        assert!(!html.contains("empty-message\">"));
        assert!(html.contains("<li>臺北市</li>"));
        assert!(html.contains("<span id=\"visited-count\">1</span>"));
        assert!(html.contains("data-focus-area=\"臺北市\""));
        assert!(!html.contains("<option value=\"臺北市\">"));
    }
}
