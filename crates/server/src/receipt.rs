//! Receipt extraction endpoint.
//!
//! Extraction talks to an external vision service and returns best-effort
//! structured data. Nothing here writes to the engine; clients review the
//! result and submit it through the normal bill and item endpoints.

use api_types::receipt::{ExtractedBill, ReceiptScan};
use axum::{Json, extract::State};
use engine::round_to_two;
use serde::Serialize;

use crate::{ServerError, server::ServerState};

/// Client for the external receipt-extraction service.
pub struct ReceiptService {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    image: &'a str,
}

impl ReceiptService {
    pub fn new(url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            api_key,
        }
    }

    pub async fn extract(&self, image: &str) -> Result<ExtractedBill, ServerError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&ExtractRequest { image })
            .send()
            .await
            .map_err(|err| ServerError::Upstream(err.to_string()))?;

        if !response.status().is_success() {
            return Err(ServerError::Upstream(format!(
                "extraction service answered {}",
                response.status()
            )));
        }

        let raw: ExtractedBill = response
            .json()
            .await
            .map_err(|err| ServerError::Upstream(err.to_string()))?;

        Ok(clean_extracted(raw))
    }
}

/// Normalizes raw extraction output before it reaches a client.
///
/// Drops unnamed or non-positive-price items, clamps quantities to at
/// least one, rounds all amounts to cents, and derives the subtotal from
/// the items when the service failed to read one.
fn clean_extracted(raw: ExtractedBill) -> ExtractedBill {
    let items: Vec<_> = raw
        .items
        .into_iter()
        .filter(|item| item.price > 0.0 && !item.name.trim().is_empty())
        .map(|mut item| {
            item.quantity = item.quantity.max(1);
            item.price = round_to_two(item.price);
            item
        })
        .collect();

    let mut subtotal = round_to_two(raw.subtotal);
    if subtotal == 0.0 {
        subtotal = round_to_two(
            items
                .iter()
                .map(|item| item.price * f64::from(item.quantity))
                .sum(),
        );
    }

    let tax = round_to_two(raw.tax);
    let service_charge = round_to_two(raw.service_charge);
    let discount = round_to_two(raw.discount);

    let mut total = round_to_two(raw.total);
    if total == 0.0 {
        total = round_to_two(subtotal + tax + service_charge - discount);
    }

    ExtractedBill {
        restaurant_name: raw
            .restaurant_name
            .filter(|name| !name.trim().is_empty()),
        items,
        subtotal,
        tax,
        service_charge,
        discount,
        total,
    }
}

pub async fn scan(
    State(state): State<ServerState>,
    Json(payload): Json<ReceiptScan>,
) -> Result<Json<ExtractedBill>, ServerError> {
    let Some(service) = state.receipt.as_ref() else {
        return Err(ServerError::Unavailable(
            "receipt extraction is not configured".to_string(),
        ));
    };

    if payload.image.trim().is_empty() {
        return Err(ServerError::Generic("image must not be empty".to_string()));
    }

    let extracted = service.extract(&payload.image).await?;
    Ok(Json(extracted))
}
