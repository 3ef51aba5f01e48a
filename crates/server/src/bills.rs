//! Bill API endpoints

use api_types::bill::{
    BillJoin, BillListQuery, BillNew, BillSnapshotResponse, BillUpdate, BillView,
};
use api_types::item::ItemView;
use api_types::payment::ParticipantView;
use api_types::selection::SelectionView;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

pub(crate) fn map_bill(bill: engine::Bill) -> BillView {
    BillView {
        id: bill.id,
        group_code: bill.group_code,
        name: bill.name,
        subtotal: bill.subtotal,
        tax: bill.tax,
        service_charge: bill.service_charge,
        total: bill.total,
        created_at: bill.created_at,
    }
}

pub(crate) fn map_item(item: engine::BillItem) -> ItemView {
    ItemView {
        id: item.id,
        name: item.name,
        quantity: item.quantity,
        price: item.price,
    }
}

fn map_snapshot(snapshot: engine::BillSnapshot) -> BillSnapshotResponse {
    BillSnapshotResponse {
        bill: map_bill(snapshot.bill),
        items: snapshot.items.into_iter().map(map_item).collect(),
        selections: snapshot
            .selections
            .into_iter()
            .map(|s| SelectionView {
                id: s.id,
                item_id: s.item_id,
                user_id: s.user_id,
                split_ratio: s.split_ratio,
            })
            .collect(),
        participants: snapshot
            .participants
            .into_iter()
            .map(|p| ParticipantView {
                user_id: p.user_id,
                name: p.name,
                amount_owed: p.amount_owed,
                amount_paid: p.amount_paid,
            })
            .collect(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BillNew>,
) -> Result<(StatusCode, Json<BillView>), ServerError> {
    let bill = state
        .engine
        .new_bill(
            payload.name.as_deref(),
            payload.subtotal.unwrap_or(0.0),
            payload.tax.unwrap_or(0.0),
            payload.service_charge.unwrap_or(0.0),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(map_bill(bill))))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<BillListQuery>,
) -> Result<Json<Vec<BillView>>, ServerError> {
    let bills = state.engine.bills_for_user(&query.user_id).await?;
    Ok(Json(bills.into_iter().map(map_bill).collect()))
}

pub async fn get_by_code(
    State(state): State<ServerState>,
    Path(group_code): Path<String>,
) -> Result<Json<BillSnapshotResponse>, ServerError> {
    let snapshot = state.engine.bill_by_code(&group_code).await?;
    Ok(Json(map_snapshot(snapshot)))
}

pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<BillUpdate>,
) -> Result<Json<BillView>, ServerError> {
    let bill = state
        .engine
        .update_bill(
            &payload.bill_id,
            payload.name.as_deref(),
            payload.subtotal,
            payload.tax,
            payload.service_charge,
        )
        .await?;

    Ok(Json(map_bill(bill)))
}

pub async fn join(
    State(state): State<ServerState>,
    Json(payload): Json<BillJoin>,
) -> Result<Json<BillView>, ServerError> {
    let bill = state
        .engine
        .join_bill(&payload.group_code, &payload.user_id)
        .await?;

    Ok(Json(map_bill(bill)))
}
