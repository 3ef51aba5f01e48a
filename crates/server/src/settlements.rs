//! Settlement API endpoints

use api_types::settlement::{PartyView, SettlementView, SettlementsResponse};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState};

pub async fn get_settlements(
    State(state): State<ServerState>,
    Path(bill_id): Path<String>,
) -> Result<Json<SettlementsResponse>, ServerError> {
    let settlements = state.engine.settlements(&bill_id).await?;

    Ok(Json(SettlementsResponse {
        settlements: settlements
            .into_iter()
            .map(|s| SettlementView {
                from: PartyView {
                    user_id: s.from.user_id,
                    name: s.from.name,
                },
                to: PartyView {
                    user_id: s.to.user_id,
                    name: s.to.name,
                },
                amount: s.amount,
            })
            .collect(),
    }))
}
