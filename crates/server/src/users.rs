//! User API endpoints

use api_types::user::{UserNew, UserView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

pub(crate) fn map_user(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        phone: user.phone,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .new_user(&payload.name, &payload.email, payload.phone.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(map_user(user))))
}

pub async fn get_by_email(
    State(state): State<ServerState>,
    Path(email): Path<String>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user_by_email(&email).await?;
    Ok(Json(map_user(user)))
}
