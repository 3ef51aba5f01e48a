//! Selection API endpoints

use api_types::selection::{SelectionRemove, SelectionSet, SelectionToggled, SelectionView};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{ServerError, server::ServerState};

/// Upserts a claim, or flips it on/off when `toggle` is set.
pub async fn set(
    State(state): State<ServerState>,
    Json(payload): Json<SelectionSet>,
) -> Result<axum::response::Response, ServerError> {
    if payload.toggle.unwrap_or(false) {
        let selected = state
            .engine
            .toggle_selection(&payload.bill_id, &payload.item_id, &payload.user_id)
            .await?;
        return Ok(Json(SelectionToggled { selected }).into_response());
    }

    let selection = state
        .engine
        .set_selection(
            &payload.bill_id,
            &payload.item_id,
            &payload.user_id,
            payload.split_ratio.unwrap_or(1.0),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SelectionView {
            id: selection.id,
            item_id: selection.item_id,
            user_id: selection.user_id,
            split_ratio: selection.split_ratio,
        }),
    )
        .into_response())
}

pub async fn remove(
    State(state): State<ServerState>,
    Json(payload): Json<SelectionRemove>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_selection(&payload.bill_id, &payload.item_id, &payload.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
