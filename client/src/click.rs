use visitmap_shared::{ADD_CLICKED_AREA_PATH, AddAreaRequest, AddAreaResponse, ErrorBody};

use crate::console;
use crate::feedback::{FeedbackMessage, FeedbackToken};
use crate::layers::{RegionMap, RegionStyle};
use crate::locator::RegionBinding;
use crate::sidebar::Sidebar;

const NON_JSON_SUCCESS_MESSAGE: &str = "Operation succeeded, but the server did not return JSON.";
const DEFAULT_REJECTION_REASON: &str = "already listed or an error occurred";

/// What came back from the server before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|value| value.to_ascii_lowercase().contains("application/json"))
    }
}

/// Sends one add request for a clicked region.
pub(crate) trait AreaSubmitter {
    async fn submit(&self, area_name: &str) -> Result<RawResponse, String>;
}

/// Browser transport: `POST /add_clicked_area` through `fetch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpSubmitter;

impl AreaSubmitter for HttpSubmitter {
    async fn submit(&self, area_name: &str) -> Result<RawResponse, String> {
        let body = AddAreaRequest {
            area_name: area_name.to_owned(),
        };
        let resp = gloo_net::http::Request::post(ADD_CLICKED_AREA_PATH)
            .json(&body)
            .map_err(|e| format!("encode error: {e}"))?
            .send()
            .await
            .map_err(|e| format!("fetch error: {e}"))?;

        let status = resp.status();
        let status_text = resp.status_text();
        let content_type = resp.headers().get("content-type");
        let body = resp
            .text()
            .await
            .map_err(|e| format!("read error: {e}"))?;
        Ok(RawResponse {
            status,
            status_text,
            content_type,
            body,
        })
    }
}

/// Turn a raw response into the server's verdict, or an error description.
pub fn interpret_response(resp: &RawResponse) -> Result<AddAreaResponse, String> {
    if !resp.ok() {
        return Err(match serde_json::from_str::<ErrorBody>(&resp.body) {
            Ok(ErrorBody {
                message: Some(message),
            }) => message,
            Ok(_) => format!("Server error: {}", resp.status),
            Err(_) => {
                let status_text = if resp.status_text.is_empty() {
                    "No status text"
                } else {
                    resp.status_text.as_str()
                };
                format!("Server error: {} {status_text}", resp.status)
            }
        });
    }

    if resp.is_json() {
        return serde_json::from_str::<AddAreaResponse>(&resp.body)
            .map_err(|e| format!("invalid JSON response: {e}"));
    }

    console::warn(&format!(
        "Response from {ADD_CLICKED_AREA_PATH} was not JSON (content-type: {})",
        resp.content_type.as_deref().unwrap_or("none")
    ));
    Ok(AddAreaResponse::accepted(NON_JSON_SUCCESS_MESSAGE))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Added { message: Option<String> },
    Rejected { reason: Option<String> },
    Failed { error: String },
}

pub(crate) async fn submit_area<S: AreaSubmitter>(submitter: &S, area_name: &str) -> ClickOutcome {
    let verdict = match submitter.submit(area_name).await {
        Ok(resp) => interpret_response(&resp),
        Err(e) => Err(e),
    };
    match verdict {
        Ok(AddAreaResponse {
            success: true,
            message,
        }) => ClickOutcome::Added { message },
        Ok(AddAreaResponse { message, .. }) => ClickOutcome::Rejected { reason: message },
        Err(error) => ClickOutcome::Failed { error },
    }
}

pub fn added_text(area_name: &str) -> String {
    format!("Added: {area_name}")
}

pub fn rejected_text(area_name: &str, reason: Option<&str>) -> String {
    format!(
        "Could not add {area_name}: {}",
        reason.unwrap_or(DEFAULT_REJECTION_REASON)
    )
}

pub fn failed_text(area_name: &str, error: &str) -> String {
    format!("Error adding {area_name}: {error}")
}

/// Apply a finished click to the map and sidebar.
///
/// On success the region is restyled, then the list, dropdown, counter and
/// banner are updated in that order. Anything else only touches the banner.
/// Returns the banner token when a message was shown.
pub fn apply_outcome(
    binding: &RegionBinding,
    outcome: &ClickOutcome,
    map: &mut RegionMap,
    sidebar: &mut Sidebar,
) -> Option<FeedbackToken> {
    let area_name = binding.area_name.as_str();
    match outcome {
        ClickOutcome::Added { message } => {
            console::info(&format!(
                "Added {area_name}: {}",
                message.as_deref().unwrap_or("ok")
            ));
            if !map.set_style(binding.layer_id, RegionStyle::VISITED) {
                console::warn(&format!("Layer {} for {area_name} is gone", binding.layer_id));
            }
            sidebar.update_visited_list(area_name);
            sidebar.update_dropdown(area_name);
            sidebar.update_counter();
            sidebar.show_feedback(FeedbackMessage::success(added_text(area_name)))
        }
        ClickOutcome::Rejected { reason } => {
            console::warn(&format!(
                "Server declined {area_name}: {}",
                reason.as_deref().unwrap_or("no message")
            ));
            sidebar.show_feedback(FeedbackMessage::error(rejected_text(
                area_name,
                reason.as_deref(),
            )))
        }
        ClickOutcome::Failed { error } => {
            console::error(&format!("Add request for {area_name} failed: {error}"));
            sidebar.show_feedback(FeedbackMessage::error(failed_text(area_name, error)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::BannerPhase;
    use crate::layers::tests::sample_map;
    use crate::locator::{BindingRegistry, binding_at, initialize_map_interaction};
    use crate::sidebar::tests::full_sidebar;
    use futures::executor::block_on;
    use std::cell::RefCell;

    struct FakeSubmitter {
        reply: Result<RawResponse, String>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeSubmitter {
        fn replying(reply: Result<RawResponse, String>) -> Self {
            Self {
                reply,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl AreaSubmitter for FakeSubmitter {
        async fn submit(&self, area_name: &str) -> Result<RawResponse, String> {
            self.calls.borrow_mut().push(area_name.to_owned());
            self.reply.clone()
        }
    }

    fn json_response(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            status_text: String::new(),
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
        }
    }

    fn binding_for(map: &RegionMap, name: &str) -> RegionBinding {
        let layer = map
            .features()
            .into_iter()
            .find(|layer| layer.area_name("COUNTYNAME") == Some(name))
            .expect("region in sample map");
        RegionBinding {
            layer_id: layer.id,
            area_name: name.to_string(),
        }
    }

    fn banner_text(sidebar: &Sidebar) -> Option<String> {
        sidebar
            .feedback
            .as_ref()
            .and_then(|banner| banner.message())
            .map(|message| message.text.clone())
    }

    #[test]
    fn non_2xx_prefers_server_message() {
        let resp = json_response(400, r#"{"success":false,"message":"Unknown area: 火星"}"#);
        assert_eq!(interpret_response(&resp), Err("Unknown area: 火星".to_string()));

        let resp = json_response(500, "{}");
        assert_eq!(interpret_response(&resp), Err("Server error: 500".to_string()));
    }

    #[test]
    fn non_2xx_without_json_uses_status_text() {
        let mut resp = json_response(502, "<html>Bad Gateway</html>");
        resp.status_text = "Bad Gateway".to_string();
        assert_eq!(
            interpret_response(&resp),
            Err("Server error: 502 Bad Gateway".to_string())
        );

        resp.status_text.clear();
        assert_eq!(
            interpret_response(&resp),
            Err("Server error: 502 No status text".to_string())
        );
    }

    #[test]
    fn success_without_json_is_synthesised() {
        let resp = RawResponse {
            status: 200,
            status_text: "OK".to_string(),
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: "<p>ok</p>".to_string(),
        };
        assert_eq!(
            interpret_response(&resp),
            Ok(AddAreaResponse::accepted(NON_JSON_SUCCESS_MESSAGE))
        );
    }

    #[test]
    fn malformed_json_success_is_a_failure() {
        let resp = json_response(200, "not json");
        assert!(interpret_response(&resp).is_err());
    }

    #[test]
    fn successful_click_updates_every_part() {
        let mut map = sample_map(&[]);
        let mut sidebar = full_sidebar(&["高雄市"], &["臺北市", "臺中市"]);
        let binding = binding_for(&map, "臺北市");
        let submitter = FakeSubmitter::replying(Ok(json_response(
            200,
            r#"{"success":true,"message":"Added 臺北市."}"#,
        )));

        let outcome = block_on(submit_area(&submitter, &binding.area_name));
        let token = apply_outcome(&binding, &outcome, &mut map, &mut sidebar);

        assert_eq!(submitter.calls.borrow().as_slice(), ["臺北市".to_string()]);
        assert_eq!(
            map.feature(binding.layer_id).map(|layer| layer.style),
            Some(RegionStyle::VISITED)
        );
        let list = sidebar.list.as_ref().expect("list");
        assert_eq!(list.entries().iter().filter(|e| *e == "臺北市").count(), 1);
        let mut sorted = list.entries().to_vec();
        sorted.sort_by(|a, b| crate::collation::compare_names(a, b));
        assert_eq!(list.entries(), sorted.as_slice());
        assert!(!sidebar.select.as_ref().expect("select").has_value("臺北市"));
        assert_eq!(sidebar.count.as_ref().map(|c| c.text.as_str()), Some("2"));
        assert_eq!(banner_text(&sidebar).as_deref(), Some("Added: 臺北市"));
        let token = token.expect("banner shown");
        assert_eq!(
            sidebar.feedback.as_ref().map(|banner| banner.phase()),
            Some(BannerPhase::Shown(token))
        );
    }

    #[test]
    fn rejection_only_touches_the_banner() {
        let mut map = sample_map(&["高雄市".to_string()]);
        let mut sidebar = full_sidebar(&["高雄市"], &["臺北市"]);
        let before = (sidebar.list.clone(), sidebar.select.clone(), sidebar.count.clone());
        let binding = binding_for(&map, "高雄市");
        let submitter = FakeSubmitter::replying(Ok(json_response(
            200,
            r#"{"success":false,"message":"高雄市 is already in the list."}"#,
        )));

        let outcome = block_on(submit_area(&submitter, &binding.area_name));
        apply_outcome(&binding, &outcome, &mut map, &mut sidebar);

        assert_eq!(
            (sidebar.list.clone(), sidebar.select.clone(), sidebar.count.clone()),
            before
        );
        assert_eq!(
            banner_text(&sidebar).as_deref(),
            Some("Could not add 高雄市: 高雄市 is already in the list.")
        );
        assert!(
            sidebar
                .feedback
                .as_ref()
                .and_then(|banner| banner.message())
                .is_some_and(|message| message.is_error)
        );
    }

    #[test]
    fn rejection_without_message_uses_default_reason() {
        assert_eq!(
            rejected_text("臺中市", None),
            "Could not add 臺中市: already listed or an error occurred"
        );
    }

    #[test]
    fn transport_failure_leaves_state_unchanged() {
        let mut map = sample_map(&[]);
        let mut sidebar = full_sidebar(&[], &["臺中市"]);
        let before = (sidebar.list.clone(), sidebar.select.clone(), sidebar.count.clone());
        let binding = binding_for(&map, "臺中市");
        let submitter = FakeSubmitter::replying(Err("fetch error: network down".to_string()));

        let outcome = block_on(submit_area(&submitter, &binding.area_name));
        apply_outcome(&binding, &outcome, &mut map, &mut sidebar);

        assert_eq!(
            map.feature(binding.layer_id).map(|layer| layer.style),
            Some(RegionStyle::UNVISITED)
        );
        assert_eq!(
            (sidebar.list.clone(), sidebar.select.clone(), sidebar.count.clone()),
            before
        );
        assert_eq!(
            banner_text(&sidebar).as_deref(),
            Some("Error adding 臺中市: fetch error: network down")
        );
    }

    #[test]
    fn double_initialisation_sends_one_request_per_click() {
        let map = sample_map(&[]);
        let mut registry = BindingRegistry::default();
        initialize_map_interaction(Some(&map), Some("COUNTYNAME"), &mut registry)
            .expect("first init");
        initialize_map_interaction(Some(&map), Some("COUNTYNAME"), &mut registry)
            .expect("second init");

        let submitter = FakeSubmitter::replying(Ok(json_response(200, r#"{"success":true}"#)));
        let clicks = [[120.5, 22.5], [121.5, 25.5], [0.0, 0.0], [120.5, 24.5]];
        for position in clicks {
            if let Some(binding) = binding_at(&map, &registry, position) {
                block_on(submit_area(&submitter, &binding.area_name));
            }
        }

        assert_eq!(
            submitter.calls.borrow().as_slice(),
            ["高雄市".to_string(), "臺北市".to_string(), "臺中市".to_string()]
        );
    }
}
