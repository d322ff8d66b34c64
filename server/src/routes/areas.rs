use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use bytes::Bytes;
use serde_json::Value;
use tracing::{error, info};
use visitmap_shared::{AREA_NAME_KEY, AddAreaResponse};

use crate::state::AppState;
use crate::store::AddOutcome;

/// Record a region clicked on the map as visited.
///
/// Rejections for a well-formed request (already visited) are `200` with
/// `success: false`; malformed or unknown input is `400`.
pub async fn add_clicked_area(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<AddAreaResponse>) {
    state.observability.record_add_request();

    let area_name = match parse_area_name(&body) {
        Ok(name) => name,
        Err(message) => {
            state.observability.record_invalid_request();
            return (
                StatusCode::BAD_REQUEST,
                Json(AddAreaResponse::rejected(message)),
            );
        }
    };

    if !state.catalog.contains(&area_name) {
        state.observability.record_invalid_request();
        return (
            StatusCode::BAD_REQUEST,
            Json(AddAreaResponse::rejected(format!(
                "Unknown area: {area_name}"
            ))),
        );
    }

    match state.store.add(&area_name).await {
        Ok(AddOutcome::Added) => {
            state.observability.record_area_added();
            info!(area = %area_name, "area marked visited");
            (
                StatusCode::OK,
                Json(AddAreaResponse::accepted(format!("Added {area_name}."))),
            )
        }
        Ok(AddOutcome::AlreadyVisited) => {
            state.observability.record_duplicate_rejection();
            (
                StatusCode::OK,
                Json(AddAreaResponse::rejected(format!(
                    "{area_name} is already in the list."
                ))),
            )
        }
        Err(e) => {
            state.observability.record_persist_failure();
            error!(error = %e, area = %area_name, "failed to persist visited areas");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AddAreaResponse::rejected(
                    "Server error while saving the list.",
                )),
            )
        }
    }
}

fn parse_area_name(body: &[u8]) -> Result<String, &'static str> {
    let Ok(Value::Object(payload)) = serde_json::from_slice::<Value>(body) else {
        return Err("Invalid request data.");
    };
    let Some(value) = payload.get(AREA_NAME_KEY) else {
        return Err("Invalid request data.");
    };
    match value.as_str() {
        Some(name) if !name.is_empty() => Ok(name.to_owned()),
        _ => Err("No area name received."),
    }
}
