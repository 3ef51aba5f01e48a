//! Item API endpoints

use api_types::item::{ItemDelete, ItemNew, ItemUpdate, ItemView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, bills::map_item, server::ServerState};

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ItemNew>,
) -> Result<(StatusCode, Json<ItemView>), ServerError> {
    let item = state
        .engine
        .add_item(
            &payload.bill_id,
            &payload.name,
            payload.quantity.unwrap_or(1),
            payload.price,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(map_item(item))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(item_id): Path<String>,
    Json(payload): Json<ItemUpdate>,
) -> Result<Json<ItemView>, ServerError> {
    let item = state
        .engine
        .update_item(
            &payload.bill_id,
            &item_id,
            payload.name.as_deref(),
            payload.quantity,
            payload.price,
        )
        .await?;

    Ok(Json(map_item(item)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(item_id): Path<String>,
    Json(payload): Json<ItemDelete>,
) -> Result<StatusCode, ServerError> {
    state.engine.remove_item(&payload.bill_id, &item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
