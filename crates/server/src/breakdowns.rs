//! Breakdown API endpoints

use api_types::breakdown::{BreakdownResponse, ItemContributionView, UserBreakdownView};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, bills::map_item, server::ServerState};

fn map_breakdown(breakdown: engine::UserBreakdown) -> UserBreakdownView {
    UserBreakdownView {
        user_id: breakdown.user_id,
        items_subtotal: breakdown.items_subtotal,
        tax_share: breakdown.tax_share,
        service_charge_share: breakdown.service_charge_share,
        total: breakdown.total,
        percentage: breakdown.percentage,
        items: breakdown
            .items
            .into_iter()
            .map(|c| ItemContributionView {
                item_id: c.item_id,
                name: c.name,
                amount: c.amount,
                split_ratio: c.split_ratio,
                is_shared: c.is_shared,
            })
            .collect(),
    }
}

pub async fn get_breakdowns(
    State(state): State<ServerState>,
    Path(bill_id): Path<String>,
) -> Result<Json<BreakdownResponse>, ServerError> {
    let breakdowns = state.engine.breakdowns(&bill_id).await?;
    let unclaimed = state.engine.unclaimed_items(&bill_id).await?;

    let mut breakdowns: Vec<UserBreakdownView> =
        breakdowns.into_values().map(map_breakdown).collect();
    // Map iteration order is arbitrary; present users deterministically.
    breakdowns.sort_by(|a, b| a.user_id.cmp(&b.user_id));

    Ok(Json(BreakdownResponse {
        breakdowns,
        unclaimed_items: unclaimed.into_iter().map(map_item).collect(),
    }))
}
