//! Payment API endpoints

use api_types::payment::{ParticipantView, PaymentUpdate};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
    Path(bill_id): Path<String>,
) -> Result<Json<Vec<ParticipantView>>, ServerError> {
    let snapshot = state.engine.bill(&bill_id).await?;

    Ok(Json(
        snapshot
            .participants
            .into_iter()
            .map(|p| ParticipantView {
                user_id: p.user_id,
                name: p.name,
                amount_owed: p.amount_owed,
                amount_paid: p.amount_paid,
            })
            .collect(),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<PaymentUpdate>,
) -> Result<Json<ParticipantView>, ServerError> {
    let participant = state
        .engine
        .record_payment(&payload.bill_id, &payload.user_id, payload.amount_paid)
        .await?;

    // The engine does not join the user here; reuse the snapshot for names.
    let snapshot = state.engine.bill(&payload.bill_id).await?;
    let name = snapshot
        .participants
        .iter()
        .find(|p| p.user_id == participant.user_id)
        .map(|p| p.name.clone())
        .unwrap_or_default();

    Ok(Json(ParticipantView {
        user_id: participant.user_id,
        name,
        amount_owed: participant.amount_owed,
        amount_paid: participant.amount_paid,
    }))
}
