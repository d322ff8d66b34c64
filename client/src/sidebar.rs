use crate::collation::compare_names;
use crate::console;
use crate::feedback::{FeedbackBanner, FeedbackMessage, FeedbackToken};

pub const VISITED_LIST_ID: &str = "visited-list";
pub const EMPTY_MESSAGE_CLASS: &str = "empty-message";
pub const AREA_SELECT_ID: &str = "area-select";
pub const VISITED_COUNT_ID: &str = "visited-count";
pub const FEEDBACK_ID: &str = "feedback-message";

/// Visited regions as listed in the sidebar, kept in collated order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedList {
    entries: Vec<String>,
    placeholder: Option<String>,
}

impl VisitedList {
    pub fn new(entries: Vec<String>, placeholder: Option<String>) -> Self {
        Self {
            entries,
            placeholder,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Text of the "nothing visited yet" item, if it is still shown.
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry == name)
    }

    /// Stable sort, so an already ordered list stays as it is.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| compare_names(a, b));
    }

    /// Drop the placeholder and insert `name` at its collated position.
    /// Returns `false` when the name was already listed.
    pub fn insert(&mut self, name: &str) -> bool {
        self.placeholder = None;
        if self.contains(name) {
            return false;
        }
        self.entries.push(name.to_owned());
        self.sort();
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// The "add an area" dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaSelect {
    options: Vec<SelectOption>,
}

impl AreaSelect {
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn has_value(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }

    pub fn remove(&mut self, value: &str) -> bool {
        let before = self.options.len();
        self.options.retain(|option| option.value != value);
        self.options.len() != before
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedCount {
    pub text: String,
}

impl VisitedCount {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Leading integer of `text` plus one, e.g. `"3 areas"` -> `4`.
fn incremented_count(text: &str) -> Option<u64> {
    let trimmed = text.trim_start();
    let digits = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed, |end| &trimmed[..end]);
    digits.parse::<u64>().ok()?.checked_add(1)
}

/// Sidebar state. A part whose element was missing from the page is `None`;
/// its updater logs and does nothing.
#[derive(Debug, Clone, Default)]
pub struct Sidebar {
    pub list: Option<VisitedList>,
    pub select: Option<AreaSelect>,
    pub count: Option<VisitedCount>,
    pub feedback: Option<FeedbackBanner>,
}

impl Sidebar {
    pub fn update_visited_list(&mut self, area_name: &str) -> bool {
        let Some(list) = self.list.as_mut() else {
            console::error(&format!("Visited list element #{VISITED_LIST_ID} not found"));
            return false;
        };
        list.insert(area_name)
    }

    pub fn update_dropdown(&mut self, area_name: &str) -> bool {
        let Some(select) = self.select.as_mut() else {
            console::error(&format!("Dropdown element #{AREA_SELECT_ID} not found"));
            return false;
        };
        if select.remove(area_name) {
            return true;
        }
        console::warn(&format!("No dropdown option for '{area_name}' to remove"));
        false
    }

    pub fn update_counter(&mut self) -> bool {
        let Some(count) = self.count.as_mut() else {
            console::error(&format!("Counter element #{VISITED_COUNT_ID} not found"));
            return false;
        };
        if let Some(list) = &self.list {
            count.text = list.len().to_string();
            return true;
        }
        match incremented_count(&count.text) {
            Some(next) => {
                count.text = next.to_string();
                true
            }
            None => {
                console::error(&format!(
                    "Counter text '{}' is not a number; left unchanged",
                    count.text
                ));
                false
            }
        }
    }

    pub fn show_feedback(&mut self, message: FeedbackMessage) -> Option<FeedbackToken> {
        let Some(banner) = self.feedback.as_mut() else {
            console::error(&format!("Feedback element #{FEEDBACK_ID} not found"));
            return None;
        };
        Some(banner.show(message))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn full_sidebar(visited: &[&str], unvisited: &[&str]) -> Sidebar {
        let placeholder = visited
            .is_empty()
            .then(|| "No areas visited yet.".to_string());
        let mut options = vec![SelectOption::new("", "-- Select an area --")];
        options.extend(
            unvisited
                .iter()
                .map(|name| SelectOption::new(*name, *name)),
        );
        Sidebar {
            list: Some(VisitedList::new(
                visited.iter().map(|name| name.to_string()).collect(),
                placeholder,
            )),
            select: Some(AreaSelect::new(options)),
            count: Some(VisitedCount::new(visited.len().to_string())),
            feedback: Some(FeedbackBanner::default()),
        }
    }

    #[test]
    fn list_update_drops_placeholder_and_keeps_order() {
        let mut sidebar = full_sidebar(&[], &["臺北市", "臺中市"]);
        assert!(sidebar.update_visited_list("臺中市"));
        assert!(sidebar.update_visited_list("臺北市"));

        let list = sidebar.list.as_ref().expect("list present");
        assert_eq!(list.placeholder(), None);
        let mut expected = vec!["臺中市".to_string(), "臺北市".to_string()];
        expected.sort_by(|a, b| compare_names(a, b));
        assert_eq!(list.entries(), expected.as_slice());
    }

    #[test]
    fn list_update_skips_duplicates() {
        let mut sidebar = full_sidebar(&["高雄市"], &[]);
        assert!(!sidebar.update_visited_list("高雄市"));
        assert_eq!(sidebar.list.as_ref().map(VisitedList::len), Some(1));
    }

    #[test]
    fn sorting_a_sorted_list_is_a_no_op() {
        let mut list = VisitedList::new(
            vec!["a".into(), "b".into(), "c".into()],
            None,
        );
        let before = list.clone();
        list.sort();
        assert_eq!(list, before);
    }

    #[test]
    fn dropdown_update_removes_matching_option_only() {
        let mut sidebar = full_sidebar(&[], &["臺北市", "臺中市"]);
        assert!(sidebar.update_dropdown("臺北市"));
        let select = sidebar.select.as_ref().expect("select present");
        assert!(!select.has_value("臺北市"));
        assert!(select.has_value("臺中市"));
        assert!(select.has_value(""));

        assert!(!sidebar.update_dropdown("新竹市"));
        assert_eq!(sidebar.select.as_ref().map(|s| s.options().len()), Some(2));
    }

    #[test]
    fn counter_tracks_list_entries() {
        let mut sidebar = full_sidebar(&["臺北市"], &["臺中市"]);
        sidebar.update_visited_list("臺中市");
        assert!(sidebar.update_counter());
        assert_eq!(sidebar.count.as_ref().map(|c| c.text.as_str()), Some("2"));
    }

    #[test]
    fn counter_increments_text_without_list() {
        let mut sidebar = full_sidebar(&[], &[]);
        sidebar.list = None;
        sidebar.count = Some(VisitedCount::new(" 7 areas"));
        assert!(sidebar.update_counter());
        assert_eq!(sidebar.count.as_ref().map(|c| c.text.as_str()), Some("8"));

        sidebar.count = Some(VisitedCount::new("n/a"));
        assert!(!sidebar.update_counter());
        assert_eq!(sidebar.count.as_ref().map(|c| c.text.as_str()), Some("n/a"));
    }

    #[test]
    fn missing_parts_only_disable_their_own_updater() {
        let mut sidebar = full_sidebar(&[], &["臺北市"]);
        sidebar.select = None;
        sidebar.feedback = None;

        assert!(sidebar.update_visited_list("臺北市"));
        assert!(!sidebar.update_dropdown("臺北市"));
        assert!(sidebar.update_counter());
        assert_eq!(
            sidebar.show_feedback(FeedbackMessage::success("Added: 臺北市")),
            None
        );
        assert_eq!(sidebar.count.as_ref().map(|c| c.text.as_str()), Some("1"));
    }
}
