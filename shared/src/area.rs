use serde::{Deserialize, Serialize};

/// Endpoint that records a clicked region as visited.
pub const ADD_CLICKED_AREA_PATH: &str = "/add_clicked_area";

/// Key carrying the region name in the add request body.
pub const AREA_NAME_KEY: &str = "area_name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAreaRequest {
    pub area_name: String,
}

/// Body returned by the add endpoint, for both accepted and rejected adds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAreaResponse {
    pub success: bool,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AddAreaResponse {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Error payload of a non-2xx response. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Areas known to the server, split by visited state. Both lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaCatalog {
    #[serde(default)]
    pub available: Vec<String>,
    #[serde(default)]
    pub visited: Vec<String>,
}

impl AreaCatalog {
    /// Available areas that are not visited yet, in catalog order.
    pub fn unvisited(&self) -> impl Iterator<Item = &str> {
        self.available
            .iter()
            .filter(|area| !self.visited.contains(area))
            .map(String::as_str)
    }
}
